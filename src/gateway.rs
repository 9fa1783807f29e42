//! The Remote Resource Gateway: the console's only I/O boundary.
//!
//! Everything in [`crate::browser`] talks to the remote API through the
//! [`Gateway`] trait. [`HttpGateway`] is the production implementation;
//! tests substitute in-memory ones.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::model::{EntityId, PageResult, ResourceKind};

mod http_client;
pub use self::http_client::HttpGateway;

mod types;
pub use self::types::*;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized (token invalid or expired)")]
    Unauthorized,

    #[error("forbidden (insufficient permissions)")]
    Forbidden,

    /// The remote answered but declined the mutation.
    #[error("rejected: {message}")]
    Rejected { message: String },

    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport: {0}")]
    Transport(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            message: message.into(),
        }
    }
}

/// Remote API as consumed by the browser core.
///
/// Futures are `Send + 'static`-friendly so the dispatcher can run them on
/// the runtime while the owning view keeps its state on one thread.
pub trait Gateway: Send + Sync + 'static {
    /// One page of `query.kind` matching `query.filters`. Unknown filter keys
    /// mean "no constraint".
    fn list<R>(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<PageResult<R>, GatewayError>> + Send
    where
        R: DeserializeOwned + Send + 'static;

    fn get<R>(
        &self,
        kind: ResourceKind,
        id: EntityId,
    ) -> impl Future<Output = Result<R, GatewayError>> + Send
    where
        R: DeserializeOwned + Send + 'static;

    /// Transport-level success only; callers decide what a `failure`
    /// outcome means (see [`MutationResponse::into_result`]).
    fn mutate(
        &self,
        kind: ResourceKind,
        command: MutationCommand,
    ) -> impl Future<Output = Result<MutationResponse, GatewayError>> + Send;

    fn upload(
        &self,
        kind: ResourceKind,
        id: EntityId,
        file: UploadFile,
    ) -> impl Future<Output = Result<UploadResponse, GatewayError>> + Send;
}
