use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ForestModel, LogisticModel, MlpModel, ModelError, ModelHandle, ScoringModel};
use crate::recommendation::MODEL_INPUT_WIDTH;

/// Serialized model parameters, tagged by backend family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    Forest(ForestModel),
    Mlp(MlpModel),
}

impl ModelArtifact {
    /// Checks the parameters against the model row layout.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::Logistic(model) => model.validate(MODEL_INPUT_WIDTH),
            ModelArtifact::Forest(model) => {
                if model.input_width() != MODEL_INPUT_WIDTH {
                    return Err(ModelError::InvalidParameters(format!(
                        "forest expects {} columns, rows have {MODEL_INPUT_WIDTH}",
                        model.input_width()
                    )));
                }
                model.validate()
            }
            ModelArtifact::Mlp(model) => model.validate(MODEL_INPUT_WIDTH),
        }
    }

    pub fn into_handle(self) -> Result<ModelHandle, ModelError> {
        self.validate()?;
        Ok(match self {
            ModelArtifact::Logistic(model) => Arc::new(model),
            ModelArtifact::Forest(model) => Arc::new(model),
            ModelArtifact::Mlp(model) => Arc::new(model),
        })
    }
}

#[derive(Debug)]
pub enum ArtifactError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid {
        path: PathBuf,
        source: ModelError,
    },
    UnnamedFile(PathBuf),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io { path, source } => {
                write!(f, "failed to read model artifact {}: {source}", path.display())
            }
            ArtifactError::Parse { path, source } => {
                write!(f, "malformed model artifact {}: {source}", path.display())
            }
            ArtifactError::Invalid { path, source } => {
                write!(f, "model artifact {} rejected: {source}", path.display())
            }
            ArtifactError::UnnamedFile(path) => {
                write!(f, "cannot derive a model name from {}", path.display())
            }
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io { source, .. } => Some(source),
            ArtifactError::Parse { source, .. } => Some(source),
            ArtifactError::Invalid { source, .. } => Some(source),
            ArtifactError::UnnamedFile(_) => None,
        }
    }
}

/// Loads one JSON artifact. The model name is the file stem.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<(String, ModelHandle), ArtifactError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ArtifactError::UnnamedFile(path.to_path_buf()))?
        .to_string();

    let contents = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let handle = artifact
        .into_handle()
        .map_err(|source| ArtifactError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

    Ok((name, handle))
}

/// Loads every `*.json` artifact in `dir`, sorted by model name.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<(String, ModelHandle)>, ArtifactError> {
    let dir = dir.as_ref();
    let io_error = |source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(load_file).collect()
}
