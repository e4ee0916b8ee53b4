use super::function::{Connector, FunctionId};

/// Describes exactly what changed in a pipeline, delivered synchronously to
/// every registered listener after the mutation has completed.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    FunctionAdded {
        id: FunctionId,
    },
    FunctionRemoved {
        id: FunctionId,
    },
    FunctionMoved {
        id: FunctionId,
    },
    ConnectorAdded(Connector),
    ConnectorRemoved(Connector),
    ParameterChanged {
        id: FunctionId,
        index: usize,
        value: String,
    },
    TaskChanged {
        id: FunctionId,
        index: usize,
        task: Option<FunctionId>,
    },
    /// The pipeline was reset to the empty state.
    Cleared,
    /// The pipeline content was replaced wholesale, e.g. after a load.
    Reloaded,
}
