//! Conjugar application: storage, credentials and the command handlers of the CLI.

pub mod app;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod services;
pub mod settings;
pub mod storage;

pub use app::App;
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};
pub use settings::AppSettings;
