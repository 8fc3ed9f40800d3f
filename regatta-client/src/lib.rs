pub mod alerts;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod poll;
mod reply;
pub mod router;
pub mod screens;
pub mod session;

use reqwest::Client;
use regatta_common::Url;

pub use error::{Error, Result};

/// Handle to the remote API: a shared reqwest client plus the base address.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct Api {
    http: Client,
    base: Url,
}

impl Api {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, endpoint: &str) -> String {
        self.base.endpoint(endpoint)
    }
}
