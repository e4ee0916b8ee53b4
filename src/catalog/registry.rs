use super::types::FunctionType;
use ahash::AHashMap;

/// Immutable registry of the function types available to a pipeline.
///
/// Loaded once at startup from an external definition source and consumed
/// read-only afterwards. Lookup is by type id; iteration keeps the definition
/// order so listings stay stable.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: Vec<FunctionType>,
    index: AHashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from a list of type descriptors. A duplicated id
    /// replaces the earlier descriptor.
    pub fn new(types: Vec<FunctionType>) -> Self {
        let mut catalog = Catalog::default();
        for function_type in types {
            catalog.insert(function_type);
        }
        catalog
    }

    /// Deserializes a catalog from a JSON array of type descriptors.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let types: Vec<FunctionType> = serde_json::from_str(input)?;
        Ok(Self::new(types))
    }

    fn insert(&mut self, function_type: FunctionType) {
        match self.index.get(&function_type.id).copied() {
            Some(slot) => self.types[slot] = function_type,
            None => {
                self.index.insert(function_type.id.clone(), self.types.len());
                self.types.push(function_type);
            }
        }
    }

    /// Looks up a function type by its case-sensitive id.
    pub fn get(&self, type_id: &str) -> Option<&FunctionType> {
        self.index.get(type_id).map(|&slot| &self.types[slot])
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
