//! 传输层抽象
//!
//! 把 HTTP 传输收敛为"发送 GET、拿到响应"的窄能力。
//! 实现必须对并发调用安全；非成功状态由调用方解释，传输层不抛错。

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{RepoError, Result};

/// 原始响应：状态码 + 响应体
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 响应体
    pub body: Bytes,
}

impl TransportResponse {
    /// 创建响应
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 是否为成功状态（2xx）
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 响应体按 UTF-8 解码
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| RepoError::parse(format!("Response body is not valid UTF-8: {}", e)))
    }

    /// 响应体解析为 JSON 树
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RepoError::parse(format!("Response body is not valid JSON: {}", e)))
    }
}

/// 传输能力 trait
///
/// 所有传输实现（HTTP、测试用内存实现）都需要实现这个 trait。
/// 注意：由于需要动态分发（dyn），使用 async-trait。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 对绝对 URL 发起 GET 请求
    ///
    /// 取消信号触发时放弃等待并返回 `Cancelled`，
    /// 已发出的请求结果被丢弃。
    async fn get(&self, url: &Url, cancel: &CancellationToken) -> Result<TransportResponse>;
}

/// 基于 reqwest 的 HTTP 传输
///
/// 持有一个连接池复用的 `reqwest::Client`，对并发调用安全。
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// 创建新的 HTTP 传输
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, cancel: &CancellationToken) -> Result<TransportResponse> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(RepoError::Cancelled),
            response = self.http_client.get(url.clone()).send() => response?,
        };

        let status = response.status().as_u16();
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(RepoError::Cancelled),
            body = response.bytes() => body?,
        };

        Ok(TransportResponse { status, body })
    }
}
