#[cfg(feature = "cli")]
pub mod cli;
pub mod secrets;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use secrets::Secrets;
pub use settings::{NotifySettings, Settings, SnapshotSettings, SourceSettings, StorageSettings};
