use super::event::PipelineEvent;
use super::function::{Connector, FunctionId, FunctionInstance, ParameterBinding, Position};
use crate::catalog::{Catalog, FunctionType};
use crate::error::{PipelineError, SlotDirection};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type Listener = Box<dyn FnMut(&PipelineEvent)>;

/// The directed acyclic graph of function instances being edited.
///
/// Instances live in an arena keyed by [`FunctionId`]; connectors are a
/// separate edge list. Every mutating call is atomic (a rejected call leaves
/// the graph untouched), flips the dirty flag and notifies listeners with one
/// event describing exactly what changed.
pub struct Pipeline {
    catalog: Arc<Catalog>,
    functions: BTreeMap<FunctionId, FunctionInstance>,
    connectors: Vec<Connector>,
    next_id: u64,
    filename: Option<PathBuf>,
    dirty: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("functions", &self.functions)
            .field("connectors", &self.connectors)
            .field("filename", &self.filename)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Pipeline {
    /// Creates an empty pipeline over the given catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            functions: BTreeMap::new(),
            connectors: Vec::new(),
            next_id: 1,
            filename: None,
            dirty: false,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for change notifications. Listeners run
    /// synchronously, after the mutation they describe has completed.
    pub fn subscribe(&mut self, listener: impl FnMut(&PipelineEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: PipelineEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Creates a new function instance of `type_id` with all parameters at
    /// their schema defaults.
    pub fn add_function(&mut self, type_id: &str) -> Result<FunctionId, PipelineError> {
        let function_type =
            self.catalog
                .get(type_id)
                .ok_or_else(|| PipelineError::InvalidType {
                    type_id: type_id.to_string(),
                })?;

        let bindings = vec![ParameterBinding::default(); function_type.parameters.len()];
        let id = FunctionId(self.next_id);
        self.next_id += 1;

        self.functions.insert(
            id,
            FunctionInstance {
                id,
                type_id: type_id.to_string(),
                bindings,
                position: Position::default(),
            },
        );

        self.dirty = true;
        self.notify(PipelineEvent::FunctionAdded { id });
        Ok(id)
    }

    /// Removes an instance together with every connector touching it.
    /// Idempotent; returns `false` when the id was already absent.
    pub fn remove_function(&mut self, id: FunctionId) -> bool {
        if self.functions.remove(&id).is_none() {
            return false;
        }

        let (removed, kept): (Vec<_>, Vec<_>) = self
            .connectors
            .drain(..)
            .partition(|c| c.from == id || c.to == id);
        self.connectors = kept;

        self.dirty = true;
        for connector in removed {
            self.notify(PipelineEvent::ConnectorRemoved(connector));
        }
        self.notify(PipelineEvent::FunctionRemoved { id });
        true
    }

    /// Adds a connector from `from`'s output slot to `to`'s input slot.
    pub fn connect(
        &mut self,
        from: FunctionId,
        from_slot: usize,
        to: FunctionId,
        to_slot: usize,
    ) -> Result<(), PipelineError> {
        let out_arity = self.function_type_of(from)?.out_connectors;
        let in_arity = self.function_type_of(to)?.in_connectors;

        if from_slot >= out_arity {
            return Err(PipelineError::SlotOutOfRange {
                id: from,
                slot: from_slot,
                arity: out_arity,
                direction: SlotDirection::Output,
            });
        }
        if to_slot >= in_arity {
            return Err(PipelineError::SlotOutOfRange {
                id: to,
                slot: to_slot,
                arity: in_arity,
                direction: SlotDirection::Input,
            });
        }

        if self
            .connectors
            .iter()
            .any(|c| c.from == from && c.from_slot == from_slot)
        {
            return Err(PipelineError::SlotOccupied {
                id: from,
                slot: from_slot,
                direction: SlotDirection::Output,
            });
        }
        if self
            .connectors
            .iter()
            .any(|c| c.to == to && c.to_slot == to_slot)
        {
            return Err(PipelineError::SlotOccupied {
                id: to,
                slot: to_slot,
                direction: SlotDirection::Input,
            });
        }

        // The new edge closes a cycle iff `from` is already reachable from `to`.
        if from == to || self.reaches(to, from) {
            return Err(PipelineError::CycleDetected { from, to });
        }

        let connector = Connector {
            from,
            from_slot,
            to,
            to_slot,
        };
        self.connectors.push(connector);
        self.dirty = true;
        self.notify(PipelineEvent::ConnectorAdded(connector));
        Ok(())
    }

    /// Removes the exact connector if present. Idempotent.
    pub fn disconnect(
        &mut self,
        from: FunctionId,
        from_slot: usize,
        to: FunctionId,
        to_slot: usize,
    ) -> bool {
        let target = Connector {
            from,
            from_slot,
            to,
            to_slot,
        };
        match self.connectors.iter().position(|c| *c == target) {
            Some(slot) => {
                let connector = self.connectors.remove(slot);
                self.dirty = true;
                self.notify(PipelineEvent::ConnectorRemoved(connector));
                true
            }
            None => false,
        }
    }

    /// Sets a parameter to an explicit text value after validating it against
    /// the schema type.
    pub fn set_parameter(
        &mut self,
        id: FunctionId,
        index: usize,
        value: &str,
    ) -> Result<(), PipelineError> {
        let function_type = self.function_type_of(id)?;
        let schema = function_type.parameters.get(index).cloned().ok_or(
            PipelineError::ParameterOutOfRange {
                id,
                index,
                count: function_type.parameters.len(),
            },
        )?;

        if !schema.param_type.accepts(value) {
            return Err(PipelineError::UnparsableValue {
                parameter: schema.name.clone(),
                value: value.to_string(),
                expected: schema.param_type.describe(),
            });
        }

        let function = self
            .functions
            .get_mut(&id)
            .ok_or(PipelineError::FunctionNotFound { id })?;
        function.bindings[index].value = Some(value.to_string());

        self.dirty = true;
        self.notify(PipelineEvent::ParameterChanged {
            id,
            index,
            value: value.to_string(),
        });
        Ok(())
    }

    /// Binds or unbinds the sub-task reference of a parameter.
    pub fn set_parameter_task(
        &mut self,
        id: FunctionId,
        index: usize,
        task: Option<FunctionId>,
    ) -> Result<(), PipelineError> {
        if let Some(task_id) = task {
            if !self.functions.contains_key(&task_id) {
                return Err(PipelineError::FunctionNotFound { id: task_id });
            }
        }

        let count = self.function_type_of(id)?.parameters.len();
        let function = self
            .functions
            .get_mut(&id)
            .ok_or(PipelineError::FunctionNotFound { id })?;
        if index >= function.bindings.len() {
            return Err(PipelineError::ParameterOutOfRange { id, index, count });
        }
        function.bindings[index].task = task;

        self.dirty = true;
        self.notify(PipelineEvent::TaskChanged { id, index, task });
        Ok(())
    }

    /// Updates the placement metadata of an instance.
    pub fn move_function(
        &mut self,
        id: FunctionId,
        x: f64,
        y: f64,
    ) -> Result<(), PipelineError> {
        let function = self
            .functions
            .get_mut(&id)
            .ok_or(PipelineError::FunctionNotFound { id })?;
        function.position = Position { x, y };

        self.dirty = true;
        self.notify(PipelineEvent::FunctionMoved { id });
        Ok(())
    }

    /// Discards all instances and connectors, resets the filename and the
    /// dirty flag.
    pub fn clear(&mut self) {
        self.functions.clear();
        self.connectors.clear();
        self.next_id = 1;
        self.filename = None;
        self.dirty = false;
        self.notify(PipelineEvent::Cleared);
    }

    /// Replaces this pipeline's content with `other`'s, keeping the listener
    /// registrations. Used when a load replaces the edited graph.
    pub fn adopt(&mut self, other: Pipeline) {
        self.functions = other.functions;
        self.connectors = other.connectors;
        self.next_id = other.next_id;
        self.filename = other.filename;
        self.dirty = false;
        self.notify(PipelineEvent::Reloaded);
    }

    /// Records a successful save to `path`: remembers the filename and clears
    /// the dirty flag.
    pub fn mark_saved(&mut self, path: &Path) {
        self.filename = Some(path.to_path_buf());
        self.dirty = false;
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionInstance> {
        self.functions.get(&id)
    }

    /// Iterates instances in creation order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionInstance> {
        self.functions.values()
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Resolves the catalog type of an instance.
    pub fn function_type_of(&self, id: FunctionId) -> Result<&FunctionType, PipelineError> {
        let function = self
            .functions
            .get(&id)
            .ok_or(PipelineError::FunctionNotFound { id })?;
        self.catalog
            .get(&function.type_id)
            .ok_or_else(|| PipelineError::InvalidType {
                type_id: function.type_id.clone(),
            })
    }

    /// The effective text value of a parameter: the explicit value if set,
    /// the schema default otherwise.
    pub fn parameter_value(&self, id: FunctionId, index: usize) -> Option<String> {
        let function = self.functions.get(&id)?;
        let binding = function.bindings.get(index)?;
        if let Some(value) = &binding.value {
            return Some(value.clone());
        }
        let function_type = self.catalog.get(&function.type_id)?;
        function_type.parameters.get(index)?.default.clone()
    }

    /// First input slot of `id` without an incoming connector, if any.
    pub fn next_free_input_slot(&self, id: FunctionId) -> Option<usize> {
        let arity = self.function_type_of(id).ok()?.in_connectors;
        (0..arity).find(|&slot| !self.connectors.iter().any(|c| c.to == id && c.to_slot == slot))
    }

    /// First output slot of `id` without an outgoing connector, if any.
    pub fn next_free_output_slot(&self, id: FunctionId) -> Option<usize> {
        let arity = self.function_type_of(id).ok()?.out_connectors;
        (0..arity)
            .find(|&slot| !self.connectors.iter().any(|c| c.from == id && c.from_slot == slot))
    }

    /// Incoming connectors of `id`, ordered by input slot.
    pub fn incoming(&self, id: FunctionId) -> Vec<Connector> {
        let mut edges: Vec<Connector> = self
            .connectors
            .iter()
            .copied()
            .filter(|c| c.to == id)
            .collect();
        edges.sort_by_key(|c| c.to_slot);
        edges
    }

    /// Outgoing connectors of `id`, ordered by output slot.
    pub fn outgoing(&self, id: FunctionId) -> Vec<Connector> {
        let mut edges: Vec<Connector> = self
            .connectors
            .iter()
            .copied()
            .filter(|c| c.from == id)
            .collect();
        edges.sort_by_key(|c| c.from_slot);
        edges
    }

    /// Produces every instance exactly once in the deterministic traversal
    /// order the parser subsystem serializes: roots (no incoming connectors)
    /// in creation order, then depth-first along output connectors in slot
    /// order, remaining ties broken by creation order.
    pub fn ordered_sequence(&self) -> Vec<FunctionId> {
        let mut order = Vec::with_capacity(self.functions.len());
        let mut visited: Vec<FunctionId> = Vec::new();

        // BTreeMap iteration is id order, which is creation order.
        let roots: Vec<FunctionId> = self
            .functions
            .keys()
            .copied()
            .filter(|&id| !self.connectors.iter().any(|c| c.to == id))
            .collect();

        for root in roots {
            self.visit(root, &mut visited, &mut order);
        }
        order
    }

    fn visit(&self, id: FunctionId, visited: &mut Vec<FunctionId>, order: &mut Vec<FunctionId>) {
        if visited.contains(&id) {
            return;
        }
        visited.push(id);
        order.push(id);
        for connector in self.outgoing(id) {
            self.visit(connector.to, visited, order);
        }
    }

    /// Whether `to` is reachable from `from` along connectors.
    fn reaches(&self, from: FunctionId, to: FunctionId) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            for connector in self.connectors.iter().filter(|c| c.from == current) {
                if !seen.contains(&connector.to) {
                    seen.push(connector.to);
                    stack.push(connector.to);
                }
            }
        }
        false
    }
}
