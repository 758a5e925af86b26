//! 追踪接收器能力接口
//!
//! 追踪能力通过构造时显式注入，不使用进程级全局单例，
//! 便于测试时替换为记录型实现。

use crate::error::RepoError;

/// 追踪接收器
///
/// 消费方接口：进入/退出事件与错误事件。实现必须容忍空实现。
pub trait TraceSink: Send + Sync {
    /// 操作进入
    fn enter(&self, operation: &str);

    /// 操作退出
    fn exit(&self, operation: &str);

    /// 记录操作中抛出的错误
    fn error(&self, operation: &str, error: &RepoError);
}

/// 操作级追踪作用域
///
/// 创建时记录进入事件，Drop 时记录退出事件。无论正常返回、
/// 错误还是取消，退出事件都恰好记录一次。
pub struct TraceScope<'a> {
    sink: &'a dyn TraceSink,
    operation: &'static str,
}

impl<'a> TraceScope<'a> {
    /// 进入操作作用域
    pub fn enter(sink: &'a dyn TraceSink, operation: &'static str) -> Self {
        sink.enter(operation);
        Self { sink, operation }
    }

    /// 记录错误并原样返回，便于在 `map_err` 中链式使用
    pub fn record(&self, error: RepoError) -> RepoError {
        self.sink.error(self.operation, &error);
        error
    }

    /// 当前作用域的操作名
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        self.sink.exit(self.operation);
    }
}

/// 空追踪接收器（默认实现）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn enter(&self, _operation: &str) {}

    fn exit(&self, _operation: &str) {}

    fn error(&self, _operation: &str, _error: &RepoError) {}
}

/// 桥接到 `tracing` 的追踪接收器
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTraceSink;

impl TraceSink for TracingTraceSink {
    fn enter(&self, operation: &str) {
        tracing::debug!(operation, "operation enter");
    }

    fn exit(&self, operation: &str) {
        tracing::debug!(operation, "operation exit");
    }

    fn error(&self, operation: &str, error: &RepoError) {
        tracing::error!(operation, error = %error, "operation failed");
    }
}
