//! Model metadata loading.
//!
//! Models are Teachable Machine exports: a `model.json` topology next to a
//! `metadata.json` naming the class labels. Remote exports live under
//! `<base>/<model_id>/` and are cached on disk after the first download.
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::utils::download_file;

pub const DEFAULT_MODEL_BASE_URL: &str = "https://teachablemachine.withgoogle.com/models/";

const MODEL_FILE: &str = "model.json";
const METADATA_FILE: &str = "metadata.json";
const CACHE_SUBDIR: &str = "tm-demo";

/// Failure to load a model. Fatal to the session.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("no model id given")]
    MissingModelId,
    #[error("no cache directory available, pass one explicitly")]
    NoCacheDir,
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid metadata in {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("model has no class labels")]
    NoLabels,
    #[error("model has duplicate class label {0:?}")]
    DuplicateLabel(String),
}

/// The parts of `metadata.json` we care about.
///
/// Image and pose exports list their classes under `labels`, speech command
/// exports under `wordLabels`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    #[serde(alias = "wordLabels")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub image_size: Option<u32>,
}

impl ModelMetadata {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.labels.is_empty() {
            return Err(ModelLoadError::NoLabels);
        }
        let mut seen = HashSet::new();
        for label in self.labels.iter() {
            if !seen.insert(label) {
                return Err(ModelLoadError::DuplicateLabel(label.clone()));
            }
        }
        Ok(())
    }
}

/// Builds model file URLs from a base URL and a model id.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelLocator {
    base_url: String,
}

impl ModelLocator {
    pub fn new(base_url: &str) -> Self {
        let base_url = match base_url.ends_with('/') {
            true => base_url.to_owned(),
            false => format!("{base_url}/"),
        };
        Self { base_url }
    }

    pub fn model_url(&self, model_id: &str) -> String {
        format!("{}{}/{}", self.base_url, model_id, MODEL_FILE)
    }

    pub fn metadata_url(&self, model_id: &str) -> String {
        format!("{}{}/{}", self.base_url, model_id, METADATA_FILE)
    }
}

impl Default for ModelLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_BASE_URL)
    }
}

/// Where to get a model from.
#[derive(Clone, Debug)]
pub enum ModelSource {
    Remote {
        locator: ModelLocator,
        model_id: String,
        /// Defaults to the user cache directory.
        cache_dir: Option<PathBuf>,
    },
    Local(PathBuf),
}

/// A loaded model's label set and where its files are.
#[derive(Clone, Debug)]
pub struct Model {
    pub id: String,
    pub dir: PathBuf,
    pub metadata: ModelMetadata,
}

impl Model {
    pub fn labels(&self) -> &[String] {
        &self.metadata.labels
    }
}

pub async fn load_model(source: &ModelSource) -> Result<Model, ModelLoadError> {
    match source {
        ModelSource::Local(dir) => {
            let id = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "local".into());
            load_from_dir(id, dir).await
        }
        ModelSource::Remote {
            locator,
            model_id,
            cache_dir,
        } => {
            let model_id = model_id.trim();
            if model_id.is_empty() {
                return Err(ModelLoadError::MissingModelId);
            }

            let cache_dir = match cache_dir {
                Some(dir) => dir.clone(),
                None => dirs::cache_dir()
                    .ok_or(ModelLoadError::NoCacheDir)?
                    .join(CACHE_SUBDIR),
            };
            let model_dir = cache_dir.join(model_id);

            if is_cached(&model_dir) {
                log::info!("Using cached model {} in {}", model_id, model_dir.display());
            } else {
                fetch_model_files(locator, model_id, &cache_dir, &model_dir).await?;
            }

            load_from_dir(model_id.to_owned(), &model_dir).await
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ModelLoadError {
    let path = path.to_owned();
    move |source| ModelLoadError::Io { path, source }
}

fn is_cached(model_dir: &Path) -> bool {
    [METADATA_FILE, MODEL_FILE]
        .iter()
        .all(|file| model_dir.join(file).is_file())
}

/// Download both model files into a staging directory next to `model_dir`
/// and move it into place once complete. Failed downloads leave nothing
/// behind.
async fn fetch_model_files(
    locator: &ModelLocator,
    model_id: &str,
    cache_dir: &Path,
    model_dir: &Path,
) -> Result<(), ModelLoadError> {
    tokio::fs::create_dir_all(cache_dir)
        .await
        .map_err(io_error(cache_dir))?;
    let staging = tempfile::Builder::new()
        .prefix(".download-")
        .tempdir_in(cache_dir)
        .map_err(io_error(cache_dir))?;

    let client = Client::new();
    for (url, file) in [
        (locator.metadata_url(model_id), METADATA_FILE),
        (locator.model_url(model_id), MODEL_FILE),
    ] {
        log::info!("Fetching {}", &url);
        download_file(&client, &url, staging.path().join(file))
            .await
            .map_err(|e| ModelLoadError::Download {
                url: url.clone(),
                reason: format!("{e:#}"),
            })?;
    }

    if model_dir.exists() {
        log::warn!("Replacing incomplete cache in {}", model_dir.display());
        tokio::fs::remove_dir_all(model_dir)
            .await
            .map_err(io_error(model_dir))?;
    }
    tokio::fs::rename(staging.path(), model_dir)
        .await
        .map_err(io_error(model_dir))?;

    Ok(())
}

async fn load_from_dir(id: String, dir: &Path) -> Result<Model, ModelLoadError> {
    let path = dir.join(METADATA_FILE);
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ModelLoadError::Io {
            path: path.clone(),
            source,
        })?;
    let metadata =
        ModelMetadata::from_json(&json).map_err(|source| ModelLoadError::Metadata { path, source })?;
    metadata.validate()?;

    log::info!("Loaded model {} with labels {:?}", &id, &metadata.labels);

    Ok(Model {
        id,
        dir: dir.to_owned(),
        metadata,
    })
}
