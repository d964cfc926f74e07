//! Playground server API: wire types, the [`PlaygroundApi`] seam and its HTTP client.
//!
//! The server owns the text functions and the inference log; this side only fetches
//! definitions, submits inputs and browses/deletes log entries.

mod client;
mod protocol;

pub use client::{PlaygroundClient, DEFAULT_BASE_URL};
pub use protocol::{
    InferenceRequest, LogEntry, LogListing, StatusResponse, SubmissionResult, ValueType,
};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::form::FunctionInput;

/// Calls the front ends make against a playground server.
#[async_trait]
pub trait PlaygroundApi: Send + Sync {
    async fn status(&self) -> Result<StatusResponse, ClientError>;

    async fn inference(
        &self,
        name: &str,
        input: Option<FunctionInput>,
    ) -> Result<SubmissionResult, ClientError>;

    async fn list_logs(&self, page: u32) -> Result<LogListing, ClientError>;

    async fn delete_log(&self, entry_id: &str) -> Result<(), ClientError>;
}
