use std::fmt;

/// Opaque, stable handle to a function instance inside a pipeline.
///
/// Ids are allocated monotonically and never reused, so id order is creation
/// order. All graph operations address instances through this handle; no
/// mutable references into the graph are ever handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub(crate) u64);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Placement metadata of a function instance on the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Current state of one parameter slot of a function instance.
///
/// An unset value falls back to the schema default. A parameter whose value
/// denotes a sub-task may additionally reference another function instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBinding {
    pub(crate) value: Option<String>,
    pub(crate) task: Option<FunctionId>,
}

impl ParameterBinding {
    /// The explicitly set value, if any. `None` means the schema default
    /// applies.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The referenced sub-task, if any.
    pub fn task(&self) -> Option<FunctionId> {
        self.task
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// A configured occurrence of a catalog function type within a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInstance {
    pub(crate) id: FunctionId,
    pub(crate) type_id: String,
    pub(crate) bindings: Vec<ParameterBinding>,
    pub(crate) position: Position,
}

impl FunctionInstance {
    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn binding(&self, index: usize) -> Option<&ParameterBinding> {
        self.bindings.get(index)
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Directed edge from one function instance's output slot to another's input
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub from: FunctionId,
    pub from_slot: usize,
    pub to: FunctionId,
    pub to_slot: usize,
}
