//! Async client for the ToyDB document store HTTP API.
//!
//! # Overview
//! `DbClient` wraps the eight ToyDB endpoints (list/create collections, add
//! and query records, find by id, filter by field, update and add fields).
//! Each call validates its input, builds one HTTP request, performs one round
//! trip through a `Transport`, and returns the parsed reply or an error.
//!
//! # Design
//! - `DbClient` is stateless: an immutable `Endpoint` plus a transport.
//! - Each operation is split into `build_*` (validates, produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit and the
//!   halves can be driven by any HTTP stack.
//! - `ReqwestTransport` is the default transport; tests substitute their own.
//! - Nothing is retried, cached, or logged beyond a debug event per request.
//!
//! ```no_run
//! use toydb_client::{DbClient, FieldUpdate, QueryOptions};
//!
//! # async fn run() -> toydb_client::Result<()> {
//! let db = DbClient::new("http://localhost:3000")?;
//! db.create_collection("users").await?;
//! db.add_record("users", &serde_json::json!({"id": "1", "name": "Ada"})).await?;
//! let first = db.query(&QueryOptions::new("users").limit(5)).await?;
//! db.update_field(&FieldUpdate::new("users", "1", "name", "Grace")).await?;
//! # let _ = first;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::DbClient;
pub use endpoint::Endpoint;
pub use error::{ClientError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Collections, FieldUpdate, FieldValue, QueryOptions, Record, DEFAULT_QUERY_LIMIT,
    NO_COLLECTIONS,
};
