//! Boundaries to the external identity provider and data service.
//!
//! The command center only ever talks to the two traits below. `RestClient`
//! speaks the hosted REST dialect, `DevBackend` keeps everything in memory.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Identity, Session};

mod auth;
pub mod dev_backend;
pub mod dto;
mod error;
mod rest;
mod store;
#[cfg(test)]
pub(crate) mod stub_server;

pub use auth::AuthClient;
pub use dev_backend::DevBackend;
pub use error::ServiceError;
pub use rest::RestClient;
pub use store::Store;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub nulls_last: bool,
}

/// A read against one collection: equality filters plus an ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub columns: Option<String>,
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            columns: None,
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, field: &str, value: impl ToString) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            nulls_last: false,
        });
        self
    }

    pub fn order_by_nulls_last(mut self, field: &str) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            nulls_last: true,
        });
        self
    }
}

/// Generic row store. Rows are opaque JSON objects keyed by `id`.
#[async_trait]
pub trait DataService: Send + Sync + 'static {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ServiceError>;

    /// Insert one row and return it as stored (with its assigned `id`).
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, ServiceError>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), ServiceError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError>;

    /// Call a remote function owned by the service (derived computations).
    async fn invoke(&self, function: &str, body: Value) -> Result<Value, ServiceError>;
}

#[async_trait]
pub trait IdentityService: Send + Sync + 'static {
    /// `Ok(None)` means nobody is signed in, which is not an error.
    async fn current_user(&self) -> Result<Option<Identity>, ServiceError>;

    /// Trade the saved refresh token for a new session. `Ok(None)` when
    /// there is nothing to refresh with or the provider refused it.
    async fn refresh_session(&self) -> Result<Option<Session>, ServiceError>;

    fn session(&self) -> Option<Session>;
}
