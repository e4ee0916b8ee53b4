//! Unit tests for the pipeline model invariants.
mod common;
use common::*;
use osmpipe::error::{PipelineError, SlotDirection};
use osmpipe::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_add_function_unknown_type() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);

    let result = pipeline.add_function("Bogus");
    assert_eq!(
        result,
        Err(PipelineError::InvalidType {
            type_id: "Bogus".to_string()
        })
    );
    assert!(pipeline.is_empty());
    assert!(!pipeline.is_dirty());
}

#[test]
fn test_new_function_starts_at_schema_defaults() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let sort = pipeline.add_function("Sort").expect("add Sort");

    let binding = pipeline
        .function(sort)
        .and_then(|f| f.binding(0))
        .expect("binding exists");
    assert!(!binding.is_set());
    assert_eq!(
        pipeline.parameter_value(sort, 0),
        Some("10000".to_string())
    );
}

#[test]
fn test_set_parameter_validates_schema_type() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let sort = pipeline.add_function("Sort").expect("add Sort");

    let err = pipeline
        .set_parameter(sort, 0, "plenty")
        .expect_err("non-numeric buffer capacity");
    assert!(matches!(err, PipelineError::UnparsableValue { .. }));
    assert!(err.to_string().contains("plenty"));

    pipeline
        .set_parameter(sort, 0, "500")
        .expect("numeric value accepted");
    assert_eq!(pipeline.parameter_value(sort, 0), Some("500".to_string()));
}

#[test]
fn test_set_parameter_out_of_range_index() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let sort = pipeline.add_function("Sort").expect("add Sort");

    let err = pipeline
        .set_parameter(sort, 7, "500")
        .expect_err("index beyond schema");
    assert!(matches!(err, PipelineError::ParameterOutOfRange { .. }));
}

#[test]
fn test_connect_slot_out_of_range() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let read = pipeline.add_function("Read").expect("add Read");
    let write = pipeline.add_function("Write").expect("add Write");

    // Write declares no outputs at all.
    let err = pipeline
        .connect(write, 0, read, 0)
        .expect_err("Write has no output connectors");
    assert_eq!(
        err,
        PipelineError::SlotOutOfRange {
            id: write,
            slot: 0,
            arity: 0,
            direction: SlotDirection::Output,
        }
    );

    // Read declares a single output; slot 1 does not exist.
    let err = pipeline
        .connect(read, 1, write, 0)
        .expect_err("Read only has output slot 0");
    assert!(matches!(err, PipelineError::SlotOutOfRange { slot: 1, .. }));
    assert!(pipeline.connectors().is_empty());
}

#[test]
fn test_connect_occupied_slots() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let read_a = pipeline.add_function("Read").expect("add Read");
    let read_b = pipeline.add_function("Read").expect("add Read");
    let merge = pipeline.add_function("Merge").expect("add Merge");

    pipeline.connect(read_a, 0, merge, 0).expect("first edge");

    // Input slot 0 of the merge is already fed.
    let err = pipeline
        .connect(read_b, 0, merge, 0)
        .expect_err("input slot taken");
    assert_eq!(
        err,
        PipelineError::SlotOccupied {
            id: merge,
            slot: 0,
            direction: SlotDirection::Input,
        }
    );

    // Output slot 0 of read_a already feeds the merge.
    let err = pipeline
        .connect(read_a, 0, merge, 1)
        .expect_err("output slot taken");
    assert_eq!(
        err,
        PipelineError::SlotOccupied {
            id: read_a,
            slot: 0,
            direction: SlotDirection::Output,
        }
    );
    assert_eq!(pipeline.connectors().len(), 1);
}

#[test]
fn test_connect_rejects_cycles() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let filter = pipeline.add_function("Filter").expect("add Filter");
    let sort = pipeline.add_function("Sort").expect("add Sort");

    pipeline.connect(filter, 0, sort, 0).expect("forward edge");

    let err = pipeline
        .connect(sort, 0, filter, 0)
        .expect_err("closing the cycle");
    assert_eq!(
        err,
        PipelineError::CycleDetected {
            from: sort,
            to: filter
        }
    );
    // The rejected call must leave the graph unchanged.
    assert_eq!(pipeline.connectors().len(), 1);

    let lone = pipeline.add_function("Sort").expect("add Sort");
    let err = pipeline.connect(lone, 0, lone, 0).expect_err("self loop");
    assert!(matches!(err, PipelineError::CycleDetected { .. }));
}

#[test]
fn test_remove_function_is_idempotent() {
    let catalog = test_catalog();
    let (mut pipeline, _, filter, _) = scenario_chain(&catalog);

    assert!(pipeline.remove_function(filter));
    assert_eq!(pipeline.len(), 2);
    // Both edges touched the filter and must be gone.
    assert!(pipeline.connectors().is_empty());

    let snapshot = type_sequence(&pipeline);
    assert!(!pipeline.remove_function(filter));
    assert_eq!(type_sequence(&pipeline), snapshot);
}

#[test]
fn test_disconnect_is_idempotent() {
    let catalog = test_catalog();
    let (mut pipeline, read, filter, _) = scenario_chain(&catalog);

    assert!(pipeline.disconnect(read, 0, filter, 0));
    assert!(!pipeline.disconnect(read, 0, filter, 0));
    assert_eq!(pipeline.connectors().len(), 1);
}

#[test]
fn test_dirty_flag_lifecycle() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    assert!(!pipeline.is_dirty());

    let read = pipeline.add_function("Read").expect("add Read");
    assert!(pipeline.is_dirty());

    pipeline.mark_saved(std::path::Path::new("saved.sh"));
    assert!(!pipeline.is_dirty());
    assert_eq!(
        pipeline.filename(),
        Some(std::path::Path::new("saved.sh"))
    );

    pipeline.set_parameter(read, 0, "a.osm").expect("set file");
    assert!(pipeline.is_dirty());

    pipeline.clear();
    assert!(!pipeline.is_dirty());
    assert_eq!(pipeline.filename(), None);
    assert!(pipeline.is_empty());
}

#[test]
fn test_ordered_sequence_chain_and_ties() {
    let catalog = test_catalog();
    let (pipeline, _, _, _) = scenario_chain(&catalog);
    assert_eq!(type_sequence(&pipeline), vec!["Read", "Filter", "Write"]);

    // Two disconnected roots keep creation order.
    let mut pipeline = Pipeline::new(test_catalog());
    pipeline.add_function("Filter").expect("add Filter");
    pipeline.add_function("Read").expect("add Read");
    assert_eq!(type_sequence(&pipeline), vec!["Filter", "Read"]);
}

#[test]
fn test_ordered_sequence_follows_output_slots() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let read = pipeline.add_function("Read").expect("add Read");
    let tee = pipeline.add_function("Tee").expect("add Tee");
    let write_a = pipeline.add_function("Write").expect("add Write");
    let write_b = pipeline.add_function("Write").expect("add Write");

    pipeline.connect(read, 0, tee, 0).expect("Read -> Tee");
    // Connect slot 1 first; traversal must still visit slot 0 first.
    pipeline.connect(tee, 1, write_b, 0).expect("Tee -> second");
    pipeline.connect(tee, 0, write_a, 0).expect("Tee -> first");

    let sequence = pipeline.ordered_sequence();
    assert_eq!(sequence, vec![read, tee, write_a, write_b]);
}

#[test]
fn test_events_describe_exact_change() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let events: Rc<RefCell<Vec<PipelineEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    pipeline.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let read = pipeline.add_function("Read").expect("add Read");
    let filter = pipeline.add_function("Filter").expect("add Filter");
    pipeline.connect(read, 0, filter, 0).expect("connect");
    pipeline.set_parameter(read, 0, "a.osm").expect("set file");
    pipeline.remove_function(read);

    let events = events.borrow();
    assert_eq!(
        *events,
        vec![
            PipelineEvent::FunctionAdded { id: read },
            PipelineEvent::FunctionAdded { id: filter },
            PipelineEvent::ConnectorAdded(Connector {
                from: read,
                from_slot: 0,
                to: filter,
                to_slot: 0,
            }),
            PipelineEvent::ParameterChanged {
                id: read,
                index: 0,
                value: "a.osm".to_string(),
            },
            PipelineEvent::ConnectorRemoved(Connector {
                from: read,
                from_slot: 0,
                to: filter,
                to_slot: 0,
            }),
            PipelineEvent::FunctionRemoved { id: read },
        ]
    );
}

#[test]
fn test_task_reference_binding() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let filter = pipeline.add_function("Filter").expect("add Filter");
    let sort = pipeline.add_function("Sort").expect("add Sort");

    pipeline
        .set_parameter_task(filter, 0, Some(sort))
        .expect("bind sub-task");
    assert_eq!(
        pipeline.function(filter).and_then(|f| f.binding(0)).and_then(|b| b.task()),
        Some(sort)
    );

    pipeline
        .set_parameter_task(filter, 0, None)
        .expect("unbind sub-task");
    assert_eq!(
        pipeline.function(filter).and_then(|f| f.binding(0)).and_then(|b| b.task()),
        None
    );
}
