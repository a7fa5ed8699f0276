//! Error types for Crest

use thiserror::Error;

/// Core error type
///
/// Only configuration and control-path operations return errors; the
/// per-sample processing path degrades to pass-through instead of failing.
#[derive(Error, Debug)]
pub enum CrestError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Parameter queue full")]
    QueueFull,
}

/// Result type alias
pub type CrestResult<T> = Result<T, CrestError>;
