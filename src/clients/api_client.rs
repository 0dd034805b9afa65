//! 内部 API 客户端
//!
//! 封装所有与内部题目 API 相关的调用
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::{NewProblem, Problem, Proposal};

const APPLICATION_JSON: &str = "application/json";

/// 内部 API
///
/// 每个调用都是独立的，失败时返回 `UpstreamError`，不做重试
#[async_trait]
pub trait ProblemApi: Send + Sync {
    /// `GET /problem-proposals`
    async fn list_proposals(&self, creator_id: Option<i32>) -> Result<Vec<Proposal>, UpstreamError>;

    /// `POST /problems/create`
    async fn create_problem(&self, problem: &NewProblem) -> Result<Problem, UpstreamError>;

    /// `POST /problem-proposals/{id}/use`
    async fn use_proposal(&self, proposal_id: i32) -> Result<Proposal, UpstreamError>;
}

/// 基于 reqwest 的内部 API 客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// 创建新的 API 客户端
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        Self::with_base_url(&config.api_base_url, config.http_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::request_failed(base_url, e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求，检查状态码并解析 JSON 响应
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, UpstreamError> {
        let response = request
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .send()
            .await
            .map_err(|e| UpstreamError::request_failed(endpoint, e))?;

        let status = response.status();
        debug!("{} -> {}", endpoint, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| UpstreamError::DecodeFailed {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

#[async_trait]
impl ProblemApi for ApiClient {
    async fn list_proposals(&self, creator_id: Option<i32>) -> Result<Vec<Proposal>, UpstreamError> {
        let endpoint = "/problem-proposals";
        let mut request = self.http.get(self.url(endpoint));
        if let Some(player) = creator_id {
            request = request.query(&[("player", player)]);
        }
        self.send_json(request, endpoint).await
    }

    async fn create_problem(&self, problem: &NewProblem) -> Result<Problem, UpstreamError> {
        let endpoint = "/problems/create";
        debug!(
            "创建题目 Payload: creator={:?}, remaining={}, moves={} 字节",
            problem.creator_id,
            problem.remaining_tile_count,
            problem.moves.len()
        );
        let request = self.http.post(self.url(endpoint)).json(problem);
        self.send_json(request, endpoint).await
    }

    async fn use_proposal(&self, proposal_id: i32) -> Result<Proposal, UpstreamError> {
        let endpoint = format!("/problem-proposals/{}/use", proposal_id);
        let request = self.http.post(self.url(&endpoint));
        self.send_json(request, &endpoint).await
    }
}
