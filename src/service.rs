//! 服务绑定句柄
//!
//! 对解析成功的服务条目的薄包装：携带描述符与所属仓库客户端的
//! 非拥有引用，供上层服务专用客户端使用。

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::RepositoryClient;
use crate::description::ServiceDescriptor;
use crate::error::Result;
use crate::trace::TraceScope;
use crate::transport::TransportResponse;

/// 绑定到单个服务的客户端句柄
///
/// 自身不持有任何资源；共享传输通过所属仓库客户端访问。
pub struct ServiceClient<'a> {
    descriptor: ServiceDescriptor,
    repository: &'a RepositoryClient,
}

impl<'a> ServiceClient<'a> {
    /// 纯聚合，无 I/O
    pub(crate) fn new(descriptor: ServiceDescriptor, repository: &'a RepositoryClient) -> Self {
        Self {
            descriptor,
            repository,
        }
    }

    /// 绑定的服务描述符
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// 服务名
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// 服务的首个端点 URL
    pub fn url(&self) -> &Url {
        self.descriptor.url()
    }

    /// 服务的协议/版本元数据
    pub fn metadata(&self) -> &serde_json::Value {
        &self.descriptor.metadata
    }

    /// 所属仓库客户端
    pub fn repository(&self) -> &RepositoryClient {
        self.repository
    }

    /// 通过所属客户端的共享传输向服务端点发起 GET
    ///
    /// 相对地址合并到服务端点 URL；非成功状态由调用方解释。
    pub async fn get(
        &self,
        url: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<TransportResponse> {
        let trace = self.repository.trace_sink();
        let scope = TraceScope::enter(trace, "service_get");
        let context = self
            .repository
            .context_for(self.descriptor.url().clone(), cancel)
            .await
            .map_err(|e| scope.record(e))?;
        context.get(url).await.map_err(|e| scope.record(e))
    }
}
