//! # Keeper Core
//!
//! Core data operations for the config keeper service.
//!
//! This crate owns the persisted model (folders, files, content versions, listeners,
//! aliases and content formats), the SQLite store that reads and writes it, and the
//! [`KeeperService`] that validates requests and orchestrates store calls.
//!
//! Content mutations report the affected file through a [`ChangeNotifier`]. The callback
//! pipeline that delivers those notifications to listeners lives in `keeper-callback`.
//!
//! **No API concerns**: HTTP routing and response shaping belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod dto;
pub mod error;
pub mod models;
pub mod notifier;
pub mod service;
pub mod store;

pub use config::CoreConfig;
pub use error::{ErrorCatalog, ErrorCode, KeeperError, KeeperResult};
pub use notifier::{ChangeNotifier, NoopNotifier};
pub use service::KeeperService;
pub use store::Store;
