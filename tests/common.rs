//! Common test utilities for building catalogs and pipelines.
use osmpipe::prelude::*;
use std::sync::Arc;

/// Creates the catalog used across the test suite.
///
/// Read (source), Filter/Sort (1-in 1-out), Write (sink), Tee (1-in 2-out)
/// and Merge (2-in 1-out) cover every connector shape the model supports.
#[allow(dead_code)]
pub fn test_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(vec![
        FunctionType {
            id: "Read".to_string(),
            friendly_name: "Read OSM data".to_string(),
            parameters: vec![
                ParameterSchema {
                    name: "file".to_string(),
                    param_type: ParamType::Filename,
                    default: None,
                    required: true,
                },
                ParameterSchema {
                    name: "compression".to_string(),
                    param_type: ParamType::Enumeration {
                        choices: vec!["none".to_string(), "gzip".to_string()],
                    },
                    default: Some("none".to_string()),
                    required: false,
                },
            ],
            in_connectors: 0,
            out_connectors: 1,
        },
        FunctionType {
            id: "Filter".to_string(),
            friendly_name: "Filter by bounding box".to_string(),
            parameters: vec![
                ParameterSchema {
                    name: "bbox".to_string(),
                    param_type: ParamType::String,
                    default: None,
                    required: false,
                },
                ParameterSchema {
                    name: "completeWays".to_string(),
                    param_type: ParamType::Boolean,
                    default: Some("no".to_string()),
                    required: false,
                },
            ],
            in_connectors: 1,
            out_connectors: 1,
        },
        FunctionType {
            id: "Sort".to_string(),
            friendly_name: "Sort entities".to_string(),
            parameters: vec![ParameterSchema {
                name: "bufferCapacity".to_string(),
                param_type: ParamType::Int,
                default: Some("10000".to_string()),
                required: false,
            }],
            in_connectors: 1,
            out_connectors: 1,
        },
        FunctionType {
            id: "Write".to_string(),
            friendly_name: "Write OSM data".to_string(),
            parameters: vec![ParameterSchema {
                name: "file".to_string(),
                param_type: ParamType::Filename,
                default: None,
                required: true,
            }],
            in_connectors: 1,
            out_connectors: 0,
        },
        FunctionType {
            id: "Tee".to_string(),
            friendly_name: "Duplicate the stream".to_string(),
            parameters: vec![],
            in_connectors: 1,
            out_connectors: 2,
        },
        FunctionType {
            id: "Merge".to_string(),
            friendly_name: "Merge two streams".to_string(),
            parameters: vec![],
            in_connectors: 2,
            out_connectors: 1,
        },
    ]))
}

/// Builds the Read -> Filter -> Write chain from the well-known scenario.
#[allow(dead_code)]
pub fn scenario_chain(catalog: &Arc<Catalog>) -> (Pipeline, FunctionId, FunctionId, FunctionId) {
    let mut pipeline = Pipeline::new(catalog.clone());
    let read = pipeline.add_function("Read").expect("add Read");
    let filter = pipeline.add_function("Filter").expect("add Filter");
    let write = pipeline.add_function("Write").expect("add Write");
    pipeline.connect(read, 0, filter, 0).expect("Read -> Filter");
    pipeline
        .connect(filter, 0, write, 0)
        .expect("Filter -> Write");
    pipeline
        .set_parameter(read, 0, "a.osm")
        .expect("set Read file");
    pipeline
        .set_parameter(filter, 0, "1,2,3,4")
        .expect("set Filter bbox");
    pipeline
        .set_parameter(write, 0, "b.osm")
        .expect("set Write file");
    (pipeline, read, filter, write)
}

/// The ordered type ids of a pipeline's serialization sequence.
#[allow(dead_code)]
pub fn type_sequence(pipeline: &Pipeline) -> Vec<String> {
    pipeline
        .ordered_sequence()
        .into_iter()
        .filter_map(|id| pipeline.function(id).map(|f| f.type_id().to_string()))
        .collect()
}
