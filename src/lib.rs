pub mod handlers;
pub mod library;
pub mod search;
pub mod vectordb;

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
