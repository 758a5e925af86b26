//! 调用上下文
//!
//! 将共享传输、追踪接收器、基准 URL 与取消信号聚合为单个逻辑操作的
//! 作用域。每个公开操作创建一个上下文；同一操作内的嵌套调用复用
//! 同一个上下文，不再新建。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{RepoError, Result};
use crate::trace::TraceSink;
use crate::transport::{Transport, TransportResponse};

/// 单个逻辑操作的调用上下文
///
/// 传输与追踪接收器都是借用关系：上下文不管理它们的生命周期，
/// 操作结束时上下文整体释放。
pub struct InvocationContext {
    transport: Arc<dyn Transport>,
    trace: Arc<dyn TraceSink>,
    base_url: Url,
    cancel: CancellationToken,
}

impl InvocationContext {
    /// 纯聚合，无 I/O
    pub fn new(
        transport: Arc<dyn Transport>,
        trace: Arc<dyn TraceSink>,
        base_url: Url,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            trace,
            base_url,
            cancel,
        }
    }

    /// 基准 URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 取消信号
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// 追踪接收器
    pub fn trace(&self) -> &dyn TraceSink {
        self.trace.as_ref()
    }

    /// 相对 URL 按标准解析规则合并到基准 URL；绝对 URL 原样通过
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        self.base_url
            .join(url)
            .map_err(|e| RepoError::parse(format!("Invalid URL '{}': {}", url, e)))
    }

    /// 发起 GET 请求，返回原始响应
    ///
    /// 请求发出前与返回后各检查一次取消信号；已取消则不发出请求。
    /// 非成功状态不在这里解释，由调用方按协议语义处理。
    pub async fn get(&self, url: &str) -> Result<TransportResponse> {
        let absolute = self.resolve_url(url)?;

        if self.cancel.is_cancelled() {
            return Err(RepoError::Cancelled);
        }
        let response = self.transport.get(&absolute, &self.cancel).await?;
        if self.cancel.is_cancelled() {
            return Err(RepoError::Cancelled);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::NoopTraceSink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
        status: u16,
        body: String,
    }

    impl CountingTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status,
                body: body.to_string(),
            }
        }
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn get(&self, _url: &Url, _cancel: &CancellationToken) -> Result<TransportResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransportResponse::new(self.status, self.body.clone()))
        }
    }

    fn context_with(transport: Arc<dyn Transport>, base: &str) -> InvocationContext {
        InvocationContext::new(
            transport,
            Arc::new(NoopTraceSink),
            Url::parse(base).unwrap(),
            CancellationToken::new(),
        )
    }

    /// 测试：相对 URL 合并到基准 URL
    #[test]
    fn test_resolve_relative_url() {
        let transport = Arc::new(CountingTransport::new(200, ""));
        let context = context_with(transport, "https://repo.example.com");

        let resolved = context.resolve_url("/search").unwrap();
        assert_eq!(resolved.as_str(), "https://repo.example.com/search");
    }

    /// 测试：绝对 URL 原样通过
    #[test]
    fn test_resolve_absolute_url_passthrough() {
        let transport = Arc::new(CountingTransport::new(200, ""));
        let context = context_with(transport, "https://repo.example.com");

        let resolved = context.resolve_url("https://other.example.org/v1").unwrap();
        assert_eq!(resolved.as_str(), "https://other.example.org/v1");
    }

    /// 测试：已触发的取消信号阻止请求发出
    #[tokio::test]
    async fn test_pre_cancelled_skips_request() {
        let transport = Arc::new(CountingTransport::new(200, "{}"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let context = InvocationContext::new(
            transport.clone(),
            Arc::new(NoopTraceSink),
            Url::parse("https://repo.example.com").unwrap(),
            cancel,
        );

        let result = context.get("/").await;
        assert!(matches!(result, Err(RepoError::Cancelled)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    /// 测试：非成功状态原样返回，不作为错误
    #[tokio::test]
    async fn test_non_success_status_passthrough() {
        let transport = Arc::new(CountingTransport::new(500, "boom"));
        let context = context_with(transport, "https://repo.example.com");

        let response = context.get("/").await.expect("raw response expected");
        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }
}
