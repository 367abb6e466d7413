use std::path::PathBuf;
use std::time::Duration;

pub const MODEL_PATH: &str = "ml_models/waste_classifier_cnn.onnx";
pub const ENCODER_PATH: &str = "ml_models/waste_encoder.json";

pub const IMG_WIDTH: u32 = 224;
pub const IMG_HEIGHT: u32 = 224;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub model_path: PathBuf,
    pub encoder_path: PathBuf,
    /// Pixel scaling has to match how the deployed artifact was trained.
    /// The current model was trained on raw 0-255 values, so this stays off.
    pub normalize_pixels: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: port_from(std::env::var("PORT").ok()),
            model_path: PathBuf::from(MODEL_PATH),
            encoder_path: PathBuf::from(ENCODER_PATH),
            normalize_pixels: false,
        }
    }
}

fn port_from(raw: Option<String>) -> u16 {
    match raw {
        None => DEFAULT_PORT,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("invalid PORT value {value:?}, falling back to {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}
