//! Key-value settings store with serde-typed access and RON persistence.

pub mod error;
pub mod settings;

pub use error::SettingsError;
pub use settings::Settings;
