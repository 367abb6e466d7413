use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::classifier::{Classifier, OnnxClassifier};
use crate::config::{AppConfig, DOWNLOAD_TIMEOUT};

/// Label order used when the encoder artifact is missing or unusable.
/// Must match the class ordering the model was trained with.
pub const FALLBACK_LABELS: [&str; 6] = ["paper", "plastic", "metal", "glass", "organic", "trash"];

/// Read-only state shared by every request: the loaded model (if loading
/// succeeded), the index-aligned label list, and the pooled HTTP client.
/// Built once in `main` and injected into handlers via `web::Data`.
pub struct AppContext {
    pub classifier: Option<Arc<dyn Classifier>>,
    pub labels: Vec<String>,
    pub http: reqwest::Client,
    pub normalize_pixels: bool,
}

impl AppContext {
    /// One-shot artifact load. A failed model load is recorded, not fatal;
    /// the service starts and reports itself unable to predict until
    /// restarted with a working artifact.
    pub fn initialize(cfg: &AppConfig) -> Self {
        let classifier = load_classifier(&cfg.model_path);
        let labels = load_labels(&cfg.encoder_path);
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            classifier,
            labels,
            http,
            normalize_pixels: cfg.normalize_pixels,
        }
    }
}

fn load_classifier(path: &Path) -> Option<Arc<dyn Classifier>> {
    if !path.exists() {
        tracing::error!(
            "model file not found at {}; predictions will be unavailable",
            path.display()
        );
        return None;
    }
    match OnnxClassifier::load(path) {
        Ok(classifier) => {
            tracing::info!("loaded ONNX model from {}", path.display());
            Some(Arc::new(classifier))
        }
        Err(e) => {
            tracing::error!(
                "failed to load model from {}: {e}; predictions will be unavailable",
                path.display()
            );
            None
        }
    }
}

#[derive(Deserialize)]
struct EncoderFile {
    classes: Option<Vec<String>>,
}

/// Derives the label list from the encoder artifact, falling back to the
/// predefined list when the file is absent, unparseable, or lacks a
/// `classes` field.
pub fn load_labels(path: &Path) -> Vec<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                "encoder file not readable at {} ({e}); using predefined labels",
                path.display()
            );
            return fallback_labels();
        }
    };
    match serde_json::from_str::<EncoderFile>(&raw) {
        Ok(EncoderFile {
            classes: Some(classes),
        }) if !classes.is_empty() => {
            tracing::info!("loaded encoder, classes: {classes:?}");
            classes
        }
        Ok(_) => {
            tracing::warn!(
                "encoder at {} has no usable 'classes' field; using predefined labels",
                path.display()
            );
            fallback_labels()
        }
        Err(e) => {
            tracing::warn!(
                "encoder at {} could not be parsed ({e}); using predefined labels",
                path.display()
            );
            fallback_labels()
        }
    }
}

pub fn fallback_labels() -> Vec<String> {
    FALLBACK_LABELS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_encoder_uses_fallback_labels() {
        let dir = tempfile::tempdir().unwrap();
        let labels = load_labels(&dir.path().join("nope.json"));
        assert_eq!(labels, fallback_labels());
    }

    #[test]
    fn encoder_classes_are_used_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"classes": ["cardboard", "glass", "metal"]}}"#).unwrap();
        let labels = load_labels(file.path());
        assert_eq!(labels, vec!["cardboard", "glass", "metal"]);
    }

    #[test]
    fn encoder_without_classes_field_uses_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"version": 2}}"#).unwrap();
        assert_eq!(load_labels(file.path()), fallback_labels());
    }

    #[test]
    fn unparseable_encoder_uses_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x02not json at all").unwrap();
        assert_eq!(load_labels(file.path()), fallback_labels());
    }

    #[test]
    fn missing_model_leaves_classifier_unset() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_classifier(&dir.path().join("model.onnx")).is_none());
    }
}
