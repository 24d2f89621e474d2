//! Jackett indexer list fetching.
//!
//! The [`IndexerFetchClient`] opens a cookie [`Session`] (dashboard login or
//! a warm-up request), then requests the configured indexer list with the
//! API key, retrying according to a [`RetryPolicy`] table. All I/O goes
//! through the [`Transport`] trait so tests can script responses.

mod client;
mod http;
mod policy;
mod session;
mod transport;
mod types;

pub use client::{IndexerFetchClient, DASHBOARD_PATH, INDEXERS_PATH, LOGIN_PATH};
pub use http::ReqwestTransport;
pub use policy::{NextStep, RetryDecision, RetryPolicy, RETRY_RULES};
pub use session::{Session, SessionKind};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportError};
pub use types::*;
