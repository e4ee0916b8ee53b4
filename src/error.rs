use crate::pipeline::FunctionId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by mutating calls on the pipeline model.
///
/// A failed call never has a partial effect: the graph is left exactly as it
/// was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Function type '{type_id}' is not present in the catalog")]
    InvalidType { type_id: String },

    #[error("Function {id} does not exist in this pipeline")]
    FunctionNotFound { id: FunctionId },

    #[error(
        "Slot {slot} on function {id} is out of range, its type declares {arity} {direction} connector(s)"
    )]
    SlotOutOfRange {
        id: FunctionId,
        slot: usize,
        arity: usize,
        direction: SlotDirection,
    },

    #[error("Slot {slot} on function {id} already carries a connector")]
    SlotOccupied {
        id: FunctionId,
        slot: usize,
        direction: SlotDirection,
    },

    #[error("Connecting function {from} to function {to} would create a cycle")]
    CycleDetected { from: FunctionId, to: FunctionId },

    #[error(
        "Parameter index {index} on function {id} is out of range, the schema has {count} parameter(s)"
    )]
    ParameterOutOfRange {
        id: FunctionId,
        index: usize,
        count: usize,
    },

    #[error("Value '{value}' for parameter '{parameter}' cannot be read as {expected}")]
    UnparsableValue {
        parameter: String,
        value: String,
        expected: String,
    },
}

/// Which side of a function a slot error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDirection {
    Input,
    Output,
}

impl std::fmt::Display for SlotDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotDirection::Input => write!(f, "input"),
            SlotDirection::Output => write!(f, "output"),
        }
    }
}

/// Errors that can occur while converting between a pipeline and its textual
/// command representation.
///
/// Every syntax variant carries the 1-based line and column where the problem
/// was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No parser is registered for format '{format}'")]
    UnsupportedFormat { format: String },

    #[error("Unknown function type '{name}' at line {line}, column {column}")]
    UnknownFunction {
        name: String,
        line: usize,
        column: usize,
    },

    #[error(
        "Function type '{type_id}' has no parameter named '{name}' (line {line}, column {column})"
    )]
    UnknownParameter {
        type_id: String,
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Parameter '--{name}' at line {line}, column {column} is missing its value")]
    MissingValue {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Unterminated quote starting at line {line}, column {column}")]
    UnterminatedQuote { line: usize, column: usize },

    #[error("Parameter '--{name}' at line {line}, column {column} appears before any function")]
    ParameterBeforeFunction {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid connector marker '{marker}' at line {line}, column {column}: {message}")]
    InvalidMarker {
        marker: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid pipeline at line {line}, column {column}: {source}")]
    InvalidValue {
        line: usize,
        column: usize,
        #[source]
        source: PipelineError,
    },
}

/// Errors surfaced by the persistence subsystem when reading or writing a
/// named external resource.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("File '{}' could not be read", path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{}' could not be written", path.display())]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{}' does not contain a valid pipeline", path.display())]
    SyntaxProblem {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("File '{}' does not contain a valid settings document", path.display())]
    MalformedSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("This persistence handler expects {expected} content")]
    UnsupportedContent { expected: &'static str },
}
