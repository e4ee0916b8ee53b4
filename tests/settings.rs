//! Tests for the settings store: bootstrap policy, change notifications and
//! preset CRUD.
mod common;
use common::*;
use osmpipe::error::PipelineError;
use osmpipe::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[test]
fn test_initialize_creates_absent_document() {
    let catalog = test_catalog();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("settings.json");
    assert!(!path.exists());

    let factory = PersistenceFactory::new(catalog, Arc::new(ParserFactory::new()));
    let handler = factory.handler(FileType::Settings);

    let mut settings = Settings::new();
    settings
        .initialize(handler.as_ref(), &path)
        .expect("bootstrap");

    // The default document was written before the first read.
    assert!(path.exists());
    assert_eq!(settings.data(), &SettingsData::default());
}

#[test]
fn test_initialize_reads_existing_document() {
    let catalog = test_catalog();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("settings.json");

    let factory = PersistenceFactory::new(catalog, Arc::new(ParserFactory::new()));
    let handler = factory.handler(FileType::Settings);

    let mut original = Settings::new();
    original.set_language("de");
    original.set_default_zoom(2.5);
    handler
        .save(&path, FileData::Settings(original.data()))
        .expect("seed document");

    let mut settings = Settings::new();
    settings
        .initialize(handler.as_ref(), &path)
        .expect("load existing");
    assert_eq!(settings.language(), "de");
    assert_eq!(settings.default_zoom(), 2.5);
}

#[test]
fn test_setters_notify_with_snapshot() {
    let mut settings = Settings::new();
    let events: Rc<RefCell<Vec<(SettingsEvent, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    settings.subscribe(move |event, snapshot| {
        sink.borrow_mut()
            .push((event.clone(), snapshot.language.clone()));
    });

    settings.set_language("de");
    settings.set_use_short_task_names(true);

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        (
            SettingsEvent::ValueChanged(SettingKey::Language),
            "de".to_string()
        )
    );
    assert_eq!(
        events[1].0,
        SettingsEvent::ValueChanged(SettingKey::UseShortTaskNames)
    );
}

#[test]
fn test_preset_crud() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let read = pipeline.add_function("Read").expect("add Read");
    pipeline.set_parameter(read, 0, "a.osm").expect("set file");
    pipeline
        .set_parameter(read, 1, "gzip")
        .expect("set compression");

    let mut settings = Settings::new();
    let instance = pipeline.function(read).expect("instance").clone();
    let id = settings.save_preset("gzip import", &instance);

    let presets = settings.presets_for("Read");
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].id, id);
    assert_eq!(presets[0].name, "gzip import");
    assert_eq!(
        presets[0].values,
        vec![Some("a.osm".to_string()), Some("gzip".to_string())]
    );
    assert!(settings.presets_for("Write").is_empty());

    assert!(settings.delete_preset(id));
    assert!(settings.presets_for("Read").is_empty());
}

#[test]
fn test_delete_absent_preset_leaves_list_untouched() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let read = pipeline.add_function("Read").expect("add Read");
    pipeline.set_parameter(read, 0, "a.osm").expect("set file");

    let mut settings = Settings::new();
    let instance = pipeline.function(read).expect("instance").clone();
    let kept = settings.save_preset("keep me", &instance);
    assert!(settings.delete_preset(kept));
    let ghost = kept;

    let survivor = settings.save_preset("survivor", &instance);
    assert!(!settings.delete_preset(ghost));
    let presets = settings.presets_for("Read");
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].id, survivor);
}

#[test]
fn test_apply_preset_restores_values() {
    let catalog = test_catalog();
    let mut pipeline = Pipeline::new(catalog);
    let configured = pipeline.add_function("Read").expect("add Read");
    pipeline
        .set_parameter(configured, 0, "a.osm")
        .expect("set file");

    let mut settings = Settings::new();
    let instance = pipeline.function(configured).expect("instance").clone();
    let id = settings.save_preset("import", &instance);

    let fresh = pipeline.add_function("Read").expect("add Read");
    let preset = settings.preset(id).expect("preset exists").clone();
    preset
        .apply_to(&mut pipeline, fresh)
        .expect("apply to same type");
    assert_eq!(
        pipeline.parameter_value(fresh, 0),
        Some("a.osm".to_string())
    );
    // The unset compression slot keeps its schema default.
    assert_eq!(
        pipeline.parameter_value(fresh, 1),
        Some("none".to_string())
    );

    let filter = pipeline.add_function("Filter").expect("add Filter");
    let err = preset
        .apply_to(&mut pipeline, filter)
        .expect_err("apply to a different type");
    assert!(matches!(err, PipelineError::InvalidType { .. }));
}
