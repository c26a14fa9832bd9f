use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Alias file parse error: {0}")]
    AliasParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Camera permission denied")]
    CameraPermission,

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Speech recognition error: {0}")]
    Recognizer(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, VoiceError>;
