use thiserror::Error;

/// 应用程序错误类型
///
/// 各关注点的错误在初始化这样的边界处汇总到这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面自动化错误
    #[error("自动化错误: {0}")]
    Automation(#[from] AutomationError),
    /// 内容生成错误
    #[error("内容生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 文件持久化错误
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),
}

/// 应用程序结果类型
pub type AppResult<T> = std::result::Result<T, AppError>;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必需的配置项缺失
    #[error("缺少必需的配置项 {name}")]
    Missing { name: String },
    /// 配置值无法解析
    #[error("配置项 {name} 解析失败: 值 '{value}' 无法转换为 {expected}")]
    ParseFailed {
        name: String,
        value: String,
        expected: String,
    },
    /// 配置值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    Invalid { name: String, reason: String },
    /// 配置文件读取或解析失败
    #[error("配置文件 {path} 读取失败: {reason}")]
    File { path: String, reason: String },
    /// 会话凭据文件不存在
    #[error("会话凭据文件不存在: {path}（请先完成一次交互式登录）")]
    MissingCredentialStore { path: String },
    /// 会话凭据文件无法解析
    #[error("会话凭据文件 {path} 无法解析: {reason}")]
    InvalidCredentialStore { path: String, reason: String },
}

/// 浏览器启动/连接错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(#[source] chromiumoxide::error::CdpError),
    /// 连接调试端口失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

/// 页面自动化错误
///
/// 只有 `Transient` 会触发会话重建，其余都是当前单元的永久失败。
#[derive(Debug, Error)]
pub enum AutomationError {
    /// 页面崩溃、连接断开、元素失效等
    #[error("临时性自动化错误: {0}")]
    Transient(String),
    /// 硬超时
    #[error("等待 {what} 超时")]
    Timeout { what: String },
    /// 发送按钮始终不可用（可能被平台限制）
    #[error("发送按钮始终处于禁用状态")]
    ActionDisabled,
    /// 会话已关闭
    #[error("会话已关闭")]
    Closed,
}

impl AutomationError {
    /// 是否值得重建会话后重试
    pub fn is_transient(&self) -> bool {
        matches!(self, AutomationError::Transient(_))
    }
}

impl From<chromiumoxide::error::CdpError> for AutomationError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        match err {
            chromiumoxide::error::CdpError::Timeout => AutomationError::Timeout {
                what: "CDP 响应".to_string(),
            },
            other => AutomationError::Transient(other.to_string()),
        }
    }
}

/// 内容生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 文件持久化错误
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
