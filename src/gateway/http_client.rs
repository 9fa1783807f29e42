use anyhow::Context;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::*;
use crate::model::GatewayConfig;

/// [`Gateway`] over the console's JSON HTTP API.
pub struct HttpGateway {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("backoffice")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn from_config(cfg: &GatewayConfig) -> anyhow::Result<Self> {
        Self::new(cfg.base_url.clone(), cfg.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        req: RequestBuilder,
        label: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        let resp = req
            .send()
            .await
            .map_err(|err| GatewayError::Transport(format!("{}: {}", label, err)))?;
        ensure_ok(resp).await
    }
}

async fn ensure_ok(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
        StatusCode::FORBIDDEN => Err(GatewayError::Forbidden),
        _ => {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    label: &str,
) -> Result<T, GatewayError> {
    resp.json::<T>()
        .await
        .map_err(|err| GatewayError::Decode(format!("{}: {}", label, err)))
}

impl Gateway for HttpGateway {
    async fn list<R>(&self, query: ListQuery) -> Result<PageResult<R>, GatewayError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let label = format!("list {}", query.kind);
        let req = self
            .request(Method::GET, &format!("/{}", query.kind.as_str()))
            .query(&query.query_pairs());
        let resp = self.send(req, &label).await?;
        decode(resp, &label).await
    }

    async fn get<R>(&self, kind: ResourceKind, id: EntityId) -> Result<R, GatewayError>
    where
        R: DeserializeOwned + Send + 'static,
    {
        let label = format!("get {} {}", kind, id);
        let req = self.request(Method::GET, &format!("/{}/{}", kind.as_str(), id));
        let resp = self.send(req, &label).await?;
        decode(resp, &label).await
    }

    async fn mutate(
        &self,
        kind: ResourceKind,
        command: MutationCommand,
    ) -> Result<MutationResponse, GatewayError> {
        let label = format!("{} {}", command.command, kind);
        let req = self
            .request(Method::POST, &format!("/{}/mutate", kind.as_str()))
            .json(&command);
        let resp = self.send(req, &label).await?;
        decode(resp, &label).await
    }

    async fn upload(
        &self,
        kind: ResourceKind,
        id: EntityId,
        file: UploadFile,
    ) -> Result<UploadResponse, GatewayError> {
        let label = format!("upload {} {}", kind, id);
        let req = self
            .request(Method::PUT, &format!("/{}/{}/upload", kind.as_str(), id))
            .header(reqwest::header::CONTENT_TYPE, file.content_type)
            .header("x-file-name", file.file_name)
            .body(file.bytes);
        let resp = self.send(req, &label).await?;
        decode(resp, &label).await
    }
}
