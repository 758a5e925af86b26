//! Flare Repository Discovery Client
//!
//! Resolve named services published by a repository's well-known root endpoint:
//! fetch the discovery document, validate it, look services up by name, and hand
//! out service-bound client handles sharing one transport.
//!
//! 发现协议流程：拉取根文档 → 校验解析 → 按名称解析 → 绑定服务客户端。
//! 每个公开操作通过一个调用上下文串联共享传输、追踪接收器、取消信号
//! 与相对地址解析。
//!
//! ```no_run
//! use flare_repo_client::RepositoryClient;
//!
//! # async fn example() -> flare_repo_client::Result<()> {
//! let client = RepositoryClient::new("https://repo.example.com")?;
//! if let Some(search) = client.get_service("search", None).await? {
//!     println!("search endpoint: {}", search.url());
//! }
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod context;
pub mod description;
pub mod error;
pub mod service;
pub mod trace;
pub mod transport;

// Re-exports
pub use client::{RepositoryClient, RepositoryClientBuilder};
pub use context::InvocationContext;
pub use description::{RepositoryDescription, ServiceDescriptor};
pub use error::{RepoError, Result};
pub use service::ServiceClient;
pub use trace::{NoopTraceSink, TraceScope, TraceSink, TracingTraceSink};
pub use transport::{HttpTransport, Transport, TransportResponse};

// 取消信号直接复用 tokio-util 的实现
pub use tokio_util::sync::CancellationToken;
