//! Lazy, process-wide artifact cache.
//!
//! The model and its metadata are read from durable storage exactly once, on
//! first demand. The whole load outcome is cached, so a missing or corrupt
//! artifact keeps failing identically until the process restarts with a valid
//! one. Metadata is optional and degrades to an empty map.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::error::ArtifactError;
use crate::ml::model::ModelWeights;

pub type ModelMetadata = Map<String, Value>;

#[derive(Debug)]
pub struct LoadedArtifact {
    pub model: ModelWeights,
    pub metadata: ModelMetadata,
}

pub struct ArtifactStore {
    model_path: PathBuf,
    metadata_path: PathBuf,
    loaded: OnceLock<Result<Arc<LoadedArtifact>, ArtifactError>>,
}

impl ArtifactStore {
    pub fn new(model_path: PathBuf, metadata_path: PathBuf) -> Self {
        ArtifactStore {
            model_path,
            metadata_path,
            loaded: OnceLock::new(),
        }
    }

    /// Concurrent first-callers race into exactly one load; everyone observes
    /// the same cached outcome afterwards.
    pub fn load(&self) -> Result<Arc<LoadedArtifact>, ArtifactError> {
        self.loaded.get_or_init(|| self.read_artifacts()).clone()
    }

    fn read_artifacts(&self) -> Result<Arc<LoadedArtifact>, ArtifactError> {
        if !self.model_path.is_file() {
            return Err(ArtifactError::Missing {
                path: self.model_path.clone(),
            });
        }

        let data = std::fs::read(&self.model_path).map_err(|err| ArtifactError::Corrupt {
            path: self.model_path.clone(),
            reason: format!("read error: {}", err),
        })?;

        let model: ModelWeights =
            serde_json::from_slice(&data).map_err(|err| ArtifactError::Corrupt {
                path: self.model_path.clone(),
                reason: format!("parse error: {}", err),
            })?;

        model.validate().map_err(|reason| ArtifactError::Corrupt {
            path: self.model_path.clone(),
            reason,
        })?;

        let metadata = self.read_metadata();
        println!(
            "[ARTIFACT] Loaded model from {} ({} classes, {} metadata keys)",
            self.model_path.display(),
            model.classes().len(),
            metadata.len()
        );

        Ok(Arc::new(LoadedArtifact { model, metadata }))
    }

    fn read_metadata(&self) -> ModelMetadata {
        let data = match std::fs::read(&self.metadata_path) {
            Ok(data) => data,
            Err(_) => return ModelMetadata::new(),
        };

        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                eprintln!(
                    "[ARTIFACT] Ignoring unreadable metadata at {}",
                    self.metadata_path.display()
                );
                ModelMetadata::new()
            }
        }
    }
}
