//! Settings error types.

/// Errors that can occur when loading or saving a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to read the settings file from disk.
    #[error("failed to read settings: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the settings file to disk.
    #[error("failed to write settings: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse settings: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Failed to serialize the settings to RON.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] ron::Error),
}
