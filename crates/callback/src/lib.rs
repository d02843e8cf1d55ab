//! # Keeper Callback
//!
//! Asynchronous delivery of change notifications to the listeners registered on a file.
//!
//! The pipeline has four parts:
//! - [`channel`]: a bounded queue carrying file ids from content mutations to the dispatcher
//! - [`assembly`]: builds the JSON payload (file + content versions) and the listener list
//! - [`requests_controller`]: one listener's delivery, with per-attempt timeout and
//!   exponential backoff
//! - [`dispatcher`]: the long-running loop that fans each payload out to every listener
//!   under a concurrency limit
//!
//! A single [`tokio_util::sync::CancellationToken`] governs shutdown of the whole pipeline.

pub mod assembly;
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod requests_controller;
pub mod transport;

pub use assembly::{FileData, NotificationSource};
pub use channel::{callback_channel, CallbackReceiver, CallbackRequest, CallbackSender};
pub use config::{CallbackConfig, RetryPolicy};
pub use dispatcher::CallbackService;
pub use error::{CallbackError, DeliveryError, TransportError};
pub use requests_controller::RequestsController;
pub use transport::{CallbackTransport, HttpTransport};
