use serde::{Deserialize, Serialize};

/// Value type of a single function parameter.
///
/// Each variant knows how to validate a candidate text value; parameter
/// values are kept as text in the model and only checked against the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamType {
    Int,
    Double,
    Boolean,
    String,
    Filename,
    Enumeration { choices: Vec<String> },
}

impl ParamType {
    /// Checks whether `text` is a valid value for this type.
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            ParamType::Int => text.parse::<i64>().is_ok(),
            ParamType::Double => text.parse::<f64>().is_ok(),
            ParamType::Boolean => matches!(text, "true" | "false" | "yes" | "no"),
            ParamType::String | ParamType::Filename => true,
            ParamType::Enumeration { choices } => choices.iter().any(|c| c == text),
        }
    }

    /// Human description of what this type expects, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ParamType::Int => "an integer".to_string(),
            ParamType::Double => "a number".to_string(),
            ParamType::Boolean => "a boolean (true/false/yes/no)".to_string(),
            ParamType::String => "a string".to_string(),
            ParamType::Filename => "a file name".to_string(),
            ParamType::Enumeration { choices } => format!("one of [{}]", choices.join(", ")),
        }
    }
}

/// Schema of one parameter within a function type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Descriptor of one function type from the external catalog definition.
///
/// Connector counts are fixed per type; the pipeline model enforces them on
/// every `connect` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionType {
    pub id: String,
    #[serde(alias = "name")]
    pub friendly_name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    pub in_connectors: usize,
    pub out_connectors: usize,
}

impl FunctionType {
    /// Looks up a parameter schema by its case-sensitive name.
    pub fn parameter(&self, name: &str) -> Option<(usize, &ParameterSchema)> {
        self.parameters
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }
}
