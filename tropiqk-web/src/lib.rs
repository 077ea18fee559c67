pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

#[cfg(test)]
mod test_support;

use config::Settings;
use std::sync::Arc;

pub use client::TropiqkClient;
pub use error::ClientError;

/// Shared application state of the page server
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}
