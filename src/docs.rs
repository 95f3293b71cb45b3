//! Example payloads for API documentation.
//!
//! The training collaborator publishes dataset-backed example payloads next
//! to the model. Serving never depends on them: when the artifact is absent
//! or unreadable, built-in zero payloads take its place. These examples feed
//! documentation only, never validation.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::samples::{FEATURE_COUNT, GRID_SIDE};

pub fn load_examples(path: &Path) -> Map<String, Value> {
    match std::fs::read(path) {
        Ok(data) => match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Object(map)) if !map.is_empty() => return map,
            Ok(_) | Err(_) => {
                eprintln!(
                    "[DOCS] Ignoring unreadable example payloads at {}",
                    path.display()
                );
            }
        },
        Err(_) => {}
    }
    fallback_examples()
}

pub fn fallback_examples() -> Map<String, Value> {
    let flat: Vec<f64> = vec![0.0; FEATURE_COUNT];
    let nested: Vec<Vec<f64>> = vec![vec![0.0; GRID_SIDE]; GRID_SIDE];

    let mut map = Map::new();
    map.insert(
        "flattened_64".to_string(),
        json!({ "samples": [flat] }),
    );
    map.insert(
        "nested_8x8".to_string(),
        json!({ "samples": [nested] }),
    );
    map
}
