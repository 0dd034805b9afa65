//! 错误类型
//!
//! 分类与处理方式：
//! - `AuthError`：致命，整次运行中止
//! - `NavigationError` / `ExtractionError`：只影响当前提案，记录后继续
//! - `UpstreamError`：单次 API 调用失败，由调用方决定影响范围

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::Locator;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    #[error("登录错误: {0}")]
    Auth(#[from] AuthError),

    #[error("导航错误: {0}")]
    Navigation(#[from] NavigationError),

    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("API错误: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必需的环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),

    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// 页面操作失败（CDP 调用出错）
    #[error("页面操作失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// 浏览器会话已关闭
    #[error("浏览器会话已关闭")]
    Closed,
}

/// 登录步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    OpenLoginPage,
    EnterIdentifier,
    Advance,
    EnterSecret,
    Confirm,
    AwaitLoggedIn,
}

impl std::fmt::Display for LoginStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoginStep::OpenLoginPage => "打开登录页",
            LoginStep::EnterIdentifier => "输入账号",
            LoginStep::Advance => "下一步",
            LoginStep::EnterSecret => "输入密码",
            LoginStep::Confirm => "确认登录",
            LoginStep::AwaitLoggedIn => "等待登录完成",
        };
        f.write_str(name)
    }
}

/// 登录错误（致命）
#[derive(Debug, Error)]
pub enum AuthError {
    /// 某一步期望的元素在超时内没有出现
    #[error("登录步骤 [{step}] 等待元素 {locator} 超时 ({timeout:?})")]
    StepTimedOut {
        step: LoginStep,
        locator: Locator,
        timeout: Duration,
    },

    /// 提交后未出现登录成功标志，视为账号被拒绝
    #[error("外部站点拒绝登录: {reason}")]
    Rejected { reason: String },

    /// 会话状态不允许登录
    #[error("会话当前状态为 {state}，无法登录")]
    InvalidState { state: String },

    /// 浏览器操作失败
    #[error("登录步骤 [{step}] 浏览器操作失败: {source}")]
    Driver {
        step: LoginStep,
        #[source]
        source: BrowserError,
    },
}

/// 导航错误（单个提案）
#[derive(Debug, Error)]
pub enum NavigationError {
    /// 会话未登录
    #[error("会话未登录，无法打开对局 {table_id}")]
    NotAuthenticated { table_id: String },

    /// 对局地址无法构造
    #[error("对局 {table_id} 的地址无效: {reason}")]
    InvalidUrl { table_id: String, reason: String },

    /// 页面加载失败
    #[error("打开 {url} 失败: {source}")]
    LoadFailed {
        url: String,
        #[source]
        source: BrowserError,
    },

    /// 视角选择按钮没有出现
    #[error("对局 {table_id} 的视角选择按钮在 {timeout:?} 内未出现")]
    ViewpointMissing { table_id: String, timeout: Duration },

    /// 点击视角选择按钮失败
    #[error("对局 {table_id} 选择视角失败: {source}")]
    ViewpointSelectFailed {
        table_id: String,
        #[source]
        source: BrowserError,
    },
}

/// 提取错误（单个提案）
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 页面中没有找到嵌入数据标记
    #[error("对局 {table_id} 页面中未找到 g_gamelogs 标记")]
    MarkerNotFound { table_id: String },

    /// 捕获的文本不是合法的 JSON
    #[error("对局 {table_id} 的对局日志不是合法的 JSON: {source}")]
    InvalidLog {
        table_id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 内部 API 调用错误
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// API 返回非成功状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 响应体解析失败
    #[error("API响应解析失败 ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读写错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 是否会中止整次运行
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_) | AppError::Browser(_) | AppError::Auth(_)
        )
    }
}

impl UpstreamError {
    /// 创建网络请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        UpstreamError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
