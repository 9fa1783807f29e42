//! DTOs and payload types for gateway requests/responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GatewayError;
use crate::model::{EntityId, PageRequest, ResourceKind};

/// Fully resolved list request: the effective filters (unset slots already
/// dropped) and the page coordinates, captured when the fetch is issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub kind: ResourceKind,
    pub filters: BTreeMap<String, String>,
    pub page: PageRequest,
}

impl ListQuery {
    pub fn new(kind: ResourceKind, filters: BTreeMap<String, String>, page: PageRequest) -> Self {
        Self {
            kind,
            filters,
            page,
        }
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Query string pairs; paging keys win over same-named filters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .filters
            .iter()
            .filter(|(k, _)| k.as_str() != "page" && k.as_str() != "pageSize")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.push(("page".to_string(), self.page.page().to_string()));
        out.push(("pageSize".to_string(), self.page.page_size().to_string()));
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationCommand {
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    #[serde(default)]
    pub payload: Value,
}

impl MutationCommand {
    pub fn new(command: impl Into<String>, id: Option<EntityId>, payload: Value) -> Self {
        Self {
            command: command.into(),
            id,
            payload,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub outcome: Outcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResponse {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            outcome: Outcome::Success,
            data,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Any non-success outcome is treated exactly like a thrown error.
    pub fn into_result(self) -> Result<Option<Value>, GatewayError> {
        match self.outcome {
            Outcome::Success => Ok(self.data),
            Outcome::Failure => Err(GatewayError::rejected(
                self.message
                    .unwrap_or_else(|| "mutation failed".to_string()),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Reads a file from disk, guessing the content type from its extension.
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
        .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub outcome: Outcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn into_result(self) -> Result<Option<String>, GatewayError> {
        match self.outcome {
            Outcome::Success => Ok(self.url),
            Outcome::Failure => Err(GatewayError::rejected(
                self.message.unwrap_or_else(|| "upload failed".to_string()),
            )),
        }
    }
}

/// Error body shape used by the remote API.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) error: Option<String>,
}

#[cfg(test)]
#[path = "../tests/gateway/types_tests.rs"]
mod tests;
