//! 仓库发现客户端统一错误类型
//!
//! 发现/解析链路上的失败不在本地恢复：记录到追踪接收器后原样上抛。
//! "未命中"不是错误，由 `get_service` 以 `Ok(None)` 表达。

use thiserror::Error;

/// 仓库发现客户端统一错误类型
#[derive(Error, Debug, Clone)]
pub enum RepoError {
    /// 构造参数缺失或非法（构造时立即检测，不延迟到调用时）
    #[error("参数错误: {0}")]
    InvalidArgument(String),

    /// 网络失败或非成功 HTTP 状态
    #[error("传输错误: {message}")]
    Transport {
        /// HTTP 状态码（纯网络失败时为 None）
        status: Option<u16>,
        message: String,
    },

    /// 响应体不是合法 JSON，或文档结构校验失败
    #[error("解析错误: {0}")]
    Parse(String),

    /// 请求的服务名没有匹配条目（仅由 create_client 路径上抛）
    #[error("服务不存在: {0}")]
    ServiceNotFound(String),

    /// 操作在完成前被取消
    #[error("操作已取消")]
    Cancelled,

    /// 客户端释放后仍被调用
    #[error("客户端已释放")]
    Disposed,
}

impl RepoError {
    /// 创建参数错误
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        RepoError::InvalidArgument(reason.into())
    }

    /// 创建传输错误（网络层失败，无状态码）
    pub fn transport(reason: impl Into<String>) -> Self {
        RepoError::Transport {
            status: None,
            message: reason.into(),
        }
    }

    /// 创建非成功状态错误
    pub fn non_success(status: u16) -> Self {
        RepoError::Transport {
            status: Some(status),
            message: format!("Unexpected HTTP status {}", status),
        }
    }

    /// 创建解析错误
    pub fn parse(reason: impl Into<String>) -> Self {
        RepoError::Parse(reason.into())
    }

    /// 创建服务不存在错误
    pub fn service_not_found(name: impl Into<String>) -> Self {
        RepoError::ServiceNotFound(name.into())
    }

    /// 获取 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            RepoError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// 判断是否为取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RepoError::Cancelled)
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(error: reqwest::Error) -> Self {
        RepoError::Transport {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(error: serde_json::Error) -> Self {
        RepoError::Parse(error.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, RepoError>;
