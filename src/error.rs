use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid observation: box {width}x{height} must have positive finite size")]
    InvalidObservation { width: f32, height: f32 },
    #[error("unknown track id: {0}")]
    UnknownId(u64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
