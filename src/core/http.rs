use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use thiserror::Error;

/// 單次 HTTP 請求的描述
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            json: None,
            form: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_form(mut self, body: Vec<(String, String)>) -> Self {
        self.form = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// 單次嘗試的失敗；三類都採相同的重試策略
#[derive(Error, Debug)]
pub enum TransientFailure {
    #[error("connection error: {0}")]
    Transport(String),

    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransientFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            TransientFailure::Transport(_) => "transport",
            TransientFailure::MalformedBody(_) => "malformed_body",
            TransientFailure::Status { .. } => "http_status",
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransientFailure>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransientFailure> {
        let mut builder = self.client.request(request.method.clone(), &request.url);

        // 添加自定義標頭
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        // 添加查詢參數
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if let Some(body) = &request.json {
            builder = builder.json(body);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransientFailure::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransientFailure::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(60),
        }
    }
}

/// 具備固定間隔重試與節流的 HTTP 擷取器
pub struct HttpFetcher<T: HttpTransport = ReqwestTransport> {
    transport: T,
    retry: RetryPolicy,
    rate_limit: Duration,
}

impl<T: HttpTransport> HttpFetcher<T> {
    pub fn new(transport: T, retry: RetryPolicy, rate_limit: Duration) -> Self {
        Self {
            transport,
            retry,
            rate_limit,
        }
    }

    /// 執行請求並解析 JSON。
    ///
    /// 連線失敗、無法解析的回應、非 2xx 狀態碼都會在固定延遲後重試，
    /// 最多 `max_retries` 次；成功後等待一次節流延遲再回傳。
    pub async fn fetch(&self, request: &HttpRequest) -> Result<serde_json::Value> {
        let mut retries = 0u32;

        loop {
            match self.attempt(request).await {
                Ok(value) => {
                    tokio::time::sleep(self.rate_limit).await;
                    return Ok(value);
                }
                Err(failure) if retries < self.retry.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        "⏳ {} failure on {} {}, waiting {:?} and retrying (retry_count={}): {}",
                        failure.kind(),
                        request.method,
                        request.url,
                        self.retry.delay,
                        retries,
                        failure
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(failure) => {
                    tracing::error!(
                        "❌ Giving up on {} {} after {} retries ({}): {}",
                        request.method,
                        request.url,
                        retries,
                        failure.kind(),
                        failure
                    );
                    return Err(EtlError::FatalExtractionError {
                        url: request.url.clone(),
                        message: format!("gave up after {} attempt(s): {}", retries + 1, failure),
                        source: Some(failure),
                    });
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
    ) -> std::result::Result<serde_json::Value, TransientFailure> {
        tracing::debug!("Making API request to: {} {}", request.method, request.url);
        let response = self.transport.send(request).await?;
        tracing::debug!("API response status: {}", response.status);

        if !(200..300).contains(&response.status) {
            return Err(TransientFailure::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| TransientFailure::MalformedBody(e.to_string()))
    }
}
