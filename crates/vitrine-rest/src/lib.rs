//! Lazy query-builder client for PostgREST-style backends.
//!
//! A chain such as `client.from("produtos").select("*").eq("id", 1)` only
//! accumulates a [`QuerySpec`]; exactly one HTTP request is sent when the
//! builder is awaited or a terminal method (`single`, `maybe_single`,
//! `execute`) is called. Every failure, including transport errors and a
//! missing configuration, is returned as a [`RestError`].
//!
//! ```no_run
//! use vitrine_rest::{Client, Direction, RestConfig};
//!
//! # async fn run() -> vitrine_rest::Result<()> {
//! let client = Client::from_config(RestConfig::new("https://abc.example.co", "anon-key"))?;
//! let rows = client
//!     .from("produtos")
//!     .select("id, nome")
//!     .order("created_at", Direction::Desc)
//!     .limit(10)
//!     .await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod mutation;
pub mod query;
pub mod rpc;
pub mod storage;

pub use client::{Client, RestConfig, TableHandle};
pub use error::{ApiError, RestError, Result};
pub use http::{RestRequest, RestResponse, Transport, UreqTransport};
pub use mutation::{DeleteBuilder, InsertBuilder, ReturningInsert, UpdateBuilder};
pub use query::{Direction, QuerySpec, SelectBuilder};
pub use rpc::RpcBuilder;
pub use storage::{Bucket, FileOptions, StorageClient, UploadResponse};
