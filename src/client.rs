//! 仓库客户端
//!
//! 发现与解析操作的门面：独占持有传输，为每个公开操作创建调用上下文，
//! 并分发服务绑定句柄。
//!
//! 设计说明：名称解析每次都重新拉取发现文档，不做缓存。缓存作为显式的
//! 未来扩展留空（TODO: 描述文档缓存需要先定义过期与并发语义）。

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::context::InvocationContext;
use crate::description::{RepositoryDescription, ServiceDescriptor};
use crate::error::{RepoError, Result};
use crate::service::ServiceClient;
use crate::trace::{NoopTraceSink, TraceScope, TraceSink};
use crate::transport::{HttpTransport, Transport};

/// 仓库客户端构建器
pub struct RepositoryClientBuilder {
    url: String,
    trace_sink: Option<Arc<dyn TraceSink>>,
    transport: Option<Arc<dyn Transport>>,
}

impl RepositoryClientBuilder {
    /// 以仓库根 URL 创建构建器
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            trace_sink: None,
            transport: None,
        }
    }

    /// 注入追踪接收器（默认空实现）
    pub fn trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// 替换传输实现（主要用于测试替身）
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 构建客户端
    ///
    /// URL 为空或不是绝对 URL 时立即以参数错误失败，不延迟到调用时。
    pub fn build(self) -> Result<RepositoryClient> {
        if self.url.trim().is_empty() {
            return Err(RepoError::invalid_argument("Repository url must not be empty"));
        }
        let root_url = Url::parse(&self.url).map_err(|e| {
            RepoError::invalid_argument(format!("Invalid repository url '{}': {}", self.url, e))
        })?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        let trace = self
            .trace_sink
            .unwrap_or_else(|| Arc::new(NoopTraceSink));

        Ok(RepositoryClient {
            root_url,
            transport: RwLock::new(Some(transport)),
            trace,
        })
    }
}

/// 仓库客户端
///
/// 在整个生命周期内独占持有一个传输实例；除传输槽位（仅在 close 时
/// 清空一次）外没有可变状态，对并发调用安全。各并发操作互不共享
/// 上下文，也不提供跨调用的顺序保证。
pub struct RepositoryClient {
    root_url: Url,
    /// 传输槽位：close 后为 None，此后所有操作返回 Disposed
    transport: RwLock<Option<Arc<dyn Transport>>>,
    trace: Arc<dyn TraceSink>,
}

impl RepositoryClient {
    /// 使用默认（空）追踪接收器创建客户端
    pub fn new(url: impl Into<String>) -> Result<Self> {
        RepositoryClientBuilder::new(url).build()
    }

    /// 指定追踪接收器创建客户端
    pub fn with_trace_sink(url: impl Into<String>, trace_sink: Arc<dyn TraceSink>) -> Result<Self> {
        RepositoryClientBuilder::new(url).trace_sink(trace_sink).build()
    }

    /// 创建构建器
    pub fn builder(url: impl Into<String>) -> RepositoryClientBuilder {
        RepositoryClientBuilder::new(url)
    }

    /// 仓库根 URL
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// 获取仓库描述
    ///
    /// 对仓库根发起 GET，解析并校验响应体为仓库描述；相对服务地址
    /// 合并到根 URL。每次调用都重新拉取。
    pub async fn get_repository_description(
        &self,
        cancel: Option<CancellationToken>,
    ) -> Result<RepositoryDescription> {
        let scope = TraceScope::enter(self.trace.as_ref(), "get_repository_description");
        let context = self
            .context_for(self.root_url.clone(), cancel)
            .await
            .map_err(|e| scope.record(e))?;
        self.fetch_description(&context)
            .await
            .map_err(|e| scope.record(e))
    }

    /// 按名称解析服务
    ///
    /// 重新拉取仓库描述后做大小写不敏感的线性扫描，返回首个匹配；
    /// 未命中返回 `Ok(None)`，不作为错误。
    pub async fn get_service(
        &self,
        name: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<Option<ServiceDescriptor>> {
        let scope = TraceScope::enter(self.trace.as_ref(), "get_service");
        let context = self
            .context_for(self.root_url.clone(), cancel)
            .await
            .map_err(|e| scope.record(e))?;
        let description = self
            .fetch_description(&context)
            .await
            .map_err(|e| scope.record(e))?;

        Ok(description.find_service(name).cloned())
    }

    /// 解析服务并返回绑定句柄
    ///
    /// 未命中时以 `ServiceNotFound` 失败。
    pub async fn create_client(
        &self,
        name: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<ServiceClient<'_>> {
        let scope = TraceScope::enter(self.trace.as_ref(), "create_client");
        let context = self
            .context_for(self.root_url.clone(), cancel)
            .await
            .map_err(|e| scope.record(e))?;
        let description = self
            .fetch_description(&context)
            .await
            .map_err(|e| scope.record(e))?;

        match description.find_service(name) {
            Some(descriptor) => Ok(ServiceClient::new(descriptor.clone(), self)),
            None => Err(scope.record(RepoError::service_not_found(name))),
        }
    }

    /// 释放传输资源
    ///
    /// 幂等：重复调用无副作用。释放后再调用任何操作返回 `Disposed`。
    pub async fn close(&self) {
        let mut slot = self.transport.write().await;
        if slot.take().is_some() {
            tracing::debug!(root_url = %self.root_url, "repository client closed");
        }
    }

    /// 客户端是否已释放
    pub async fn is_closed(&self) -> bool {
        self.transport.read().await.is_none()
    }

    /// 追踪接收器（供服务句柄复用）
    pub(crate) fn trace_sink(&self) -> &dyn TraceSink {
        self.trace.as_ref()
    }

    /// 为一个逻辑操作创建调用上下文
    ///
    /// 读锁只用于取出传输引用，发请求前已释放，不跨越挂起点。
    pub(crate) async fn context_for(
        &self,
        base_url: Url,
        cancel: Option<CancellationToken>,
    ) -> Result<InvocationContext> {
        let transport = {
            let slot = self.transport.read().await;
            slot.clone().ok_or(RepoError::Disposed)?
        };

        Ok(InvocationContext::new(
            transport,
            self.trace.clone(),
            base_url,
            cancel.unwrap_or_default(),
        ))
    }

    /// 同一逻辑操作内复用同一个上下文完成拉取与校验
    async fn fetch_description(&self, context: &InvocationContext) -> Result<RepositoryDescription> {
        let response = context.get("/").await?;
        if !response.is_success() {
            return Err(RepoError::non_success(response.status));
        }

        let document = response.json()?;
        RepositoryDescription::from_document(&document, context.base_url())
    }
}
