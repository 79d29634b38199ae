//! Esplora-compatible block explorer backend for the xpub scanner.

pub mod config;
pub mod error;
pub mod esplora;

pub use config::ExplorerConfig;
pub use error::ExplorerError;
pub use esplora::EsploraProvider;
