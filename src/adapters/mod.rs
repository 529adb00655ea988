// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod azure;
pub mod smtp;
pub mod storage;

pub use azure::AzureBlobStore;
pub use smtp::SmtpNotifier;
pub use storage::LocalStorage;
