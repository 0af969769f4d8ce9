//! CamKit Settings Crate
//!
//! Handles settings documents, record resolution, the live settings
//! bridge, and preferences persistence.

pub mod bridge;
pub mod document;
pub mod error;
pub mod preferences;
pub mod records;
pub mod resolver;

pub use bridge::{FlagKey, ScalarKey, SettingsBridge};
pub use document::SettingsDocument;
pub use error::{SettingsError, SettingsResult};
pub use preferences::Preferences;
pub use records::{document_from_records, Category, ProcessRecord, TaskRecord, ToolRecord};
pub use resolver::CategoryResolver;
