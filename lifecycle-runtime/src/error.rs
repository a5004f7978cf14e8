//! # Error 模块
//!
//! 定义 lifecycle-runtime 中使用的错误类型。

use thiserror::Error;

/// 配置错误（构造期）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 没有声明任何状态
    #[error("至少需要声明一个状态")]
    NoStates,

    /// 状态名重复
    #[error("状态 '{name}' 重复声明")]
    DuplicateState { name: String },

    /// 同一向量中字段重复
    #[error("状态 '{state}' 中字段 '{field}' 重复")]
    DuplicateField { state: String, field: String },

    /// 字段集合与参考状态不一致
    #[error("状态 '{state}' 的字段 [{found}] 与状态 '{reference}' 的字段 [{expected}] 不一致")]
    FieldMismatch {
        state: String,
        reference: String,
        expected: String,
        found: String,
    },

    /// 字段值不是有限数
    #[error("状态 '{state}' 中字段 '{field}' 的值不是有限数")]
    NonFiniteValue { state: String, field: String },

    /// 过渡引用了未声明的状态
    #[error("过渡 '{from}' -> '{to}' 引用了未声明的状态 '{missing}'")]
    UnknownTransitionState {
        from: String,
        to: String,
        missing: String,
    },

    /// 无效的过渡时长
    #[error("过渡 '{from}' -> '{to}' 的时长无效: {duration_ms}ms（必须为正数）")]
    InvalidDuration {
        from: String,
        to: String,
        duration_ms: f64,
    },

    /// 引擎配置无效
    #[error("引擎配置无效: {message}")]
    InvalidEngine { message: String },

    /// 声明解析失败
    #[error("声明解析失败: {0}")]
    Parse(String),

    /// 声明读取失败
    #[error("声明读取失败: {0}")]
    Io(String),
}

/// 使用错误（调用期）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// 请求了未声明的状态
    #[error("状态 '{name}' 未声明")]
    UnknownState { name: String },
}

/// lifecycle-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 使用错误
    #[error("使用错误: {0}")]
    Usage(#[from] UsageError),
}

/// Result 类型别名
pub type LifecycleResult<T> = Result<T, LifecycleError>;
