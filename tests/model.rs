use std::path::{Path, PathBuf};
use unit_commitment::input::load_model;
use unit_commitment::model::InitialState;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    Path::new(file!())
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
        .join("simple")
}

/// An integration test which attempts to load the example model
#[test]
fn test_load_model() {
    let (parameters, input) = load_model(get_model_dir()).unwrap();
    assert_eq!(parameters.initial_state, InitialState::Off);
    assert_eq!(input.num_periods(), 10);
    assert_eq!(input.num_generators(), 3);
}
