pub mod app;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod handler;
pub mod input;
pub mod logging;
pub mod model;
pub mod tui;
pub mod ui;
pub mod widget;

// Re-export main types for convenience
pub use backend::BackendClient;
pub use config::Config;
pub use error::{BackendError, ConfigError};
pub use model::{ChatReply, ChatRequest, Message, MessageId, Product, Sender, SyncReport, SyncRequest};
