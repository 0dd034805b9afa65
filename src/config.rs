//! 程序配置
//!
//! 启动时构造一次，之后以引用形式传给会话管理和 API 客户端，
//! 其他模块不再自行读取环境变量。
//!
//! 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量。

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 外部站点账号
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// 密码不进日志
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 浏览器获取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverMode {
    /// 启动无头浏览器
    Headless,
    /// 启动带窗口的浏览器（便于调试）
    #[serde(alias = "local")]
    Windowed,
    /// 连接到已开启调试端口的浏览器
    Connect,
}

impl FromStr for DriverMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(DriverMode::Headless),
            "windowed" | "local" => Ok(DriverMode::Windowed),
            "connect" => Ok(DriverMode::Connect),
            _ => Err(()),
        }
    }
}

/// 各个等待步骤的超时
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepTimeouts {
    /// 登录表单中每个元素的等待时间
    pub login_step: Duration,
    /// 提交密码后等待登录成功标志
    pub login_confirm: Duration,
    /// 等待视角选择按钮
    pub viewpoint: Duration,
    /// 选择视角后等待对局日志出现
    pub log_ready: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            login_step: Duration::from_secs(10),
            login_confirm: Duration::from_secs(15),
            viewpoint: Duration::from_secs(10),
            log_ready: Duration::from_secs(8),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 外部站点地址
    pub site_base_url: String,
    /// 内部 API 地址
    pub api_base_url: String,
    /// 外部站点账号
    pub credentials: Credentials,
    /// 浏览器获取方式
    pub driver_mode: DriverMode,
    /// 浏览器调试端口（仅 connect 模式）
    pub browser_debug_port: u16,
    /// 浏览器可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 等待超时
    pub timeouts: StepTimeouts,
    /// 登录成功后才会出现的元素
    pub login_confirm_selector: String,
    /// 内部 API 请求超时
    pub http_timeout: Duration,
    /// 只处理该用户提交的提案
    pub creator_filter: Option<i32>,
    /// 运行日志文件
    pub output_log_file: String,
    /// 失败提案记录文件
    pub warn_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_base_url: "https://boardgamearena.com".to_string(),
            api_base_url: "http://0.0.0.0:8000".to_string(),
            credentials: Credentials::new("", ""),
            driver_mode: DriverMode::Headless,
            browser_debug_port: 2001,
            chrome_executable: None,
            timeouts: StepTimeouts::default(),
            login_confirm_selector: "#connected_username".to_string(),
            http_timeout: Duration::from_secs(30),
            creator_filter: None,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            verbose_logging: false,
        }
    }
}

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    site_base_url: Option<String>,
    api_base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    driver_mode: Option<DriverMode>,
    browser_debug_port: Option<u16>,
    chrome_executable: Option<String>,
    login_step_timeout_ms: Option<u64>,
    login_confirm_timeout_ms: Option<u64>,
    viewpoint_timeout_ms: Option<u64>,
    log_ready_timeout_ms: Option<u64>,
    login_confirm_selector: Option<String>,
    http_timeout_ms: Option<u64>,
    creator_id: Option<i32>,
    output_log_file: Option<String>,
    warn_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name: &str| std::env::var(name).ok())
    }

    /// 从配置文件（可选）和环境变量加载，环境变量优先
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file(path.display().to_string(), e))?;
            let file: FileConfig =
                toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
                    path: path.display().to_string(),
                    source,
                })?;
            config.apply_file(file);
        }

        config.apply_lookup(&|name: &str| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 用任意查找函数代替环境变量（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.site_base_url {
            self.site_base_url = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.username {
            self.credentials.username = v;
        }
        if let Some(v) = file.password {
            self.credentials.password = v;
        }
        if let Some(v) = file.driver_mode {
            self.driver_mode = v;
        }
        if let Some(v) = file.browser_debug_port {
            self.browser_debug_port = v;
        }
        if file.chrome_executable.is_some() {
            self.chrome_executable = file.chrome_executable;
        }
        if let Some(ms) = file.login_step_timeout_ms {
            self.timeouts.login_step = Duration::from_millis(ms);
        }
        if let Some(ms) = file.login_confirm_timeout_ms {
            self.timeouts.login_confirm = Duration::from_millis(ms);
        }
        if let Some(ms) = file.viewpoint_timeout_ms {
            self.timeouts.viewpoint = Duration::from_millis(ms);
        }
        if let Some(ms) = file.log_ready_timeout_ms {
            self.timeouts.log_ready = Duration::from_millis(ms);
        }
        if let Some(v) = file.login_confirm_selector {
            self.login_confirm_selector = v;
        }
        if let Some(ms) = file.http_timeout_ms {
            self.http_timeout = Duration::from_millis(ms);
        }
        if file.creator_id.is_some() {
            self.creator_filter = file.creator_id;
        }
        if let Some(v) = file.output_log_file {
            self.output_log_file = v;
        }
        if let Some(v) = file.warn_file {
            self.warn_file = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
    }

    fn apply_lookup(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("BGA_BASE_URL") {
            self.site_base_url = v;
        }
        if let Some(v) = lookup("API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("BGA_USERNAME") {
            self.credentials.username = v;
        }
        if let Some(v) = lookup("BGA_PASSWORD") {
            self.credentials.password = v;
        }
        if let Some(v) = lookup("DRIVER_MODE") {
            self.driver_mode = v.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "DRIVER_MODE".to_string(),
                value: v.clone(),
                expected_type: "headless | windowed | connect".to_string(),
            })?;
        }
        if let Some(port) = parse_var(lookup, "BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = port;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "LOGIN_STEP_TIMEOUT_MS", "u64")? {
            self.timeouts.login_step = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "LOGIN_CONFIRM_TIMEOUT_MS", "u64")? {
            self.timeouts.login_confirm = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "VIEWPOINT_TIMEOUT_MS", "u64")? {
            self.timeouts.viewpoint = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(lookup, "LOG_READY_TIMEOUT_MS", "u64")? {
            self.timeouts.log_ready = Duration::from_millis(ms);
        }
        if let Some(v) = lookup("LOGIN_CONFIRM_SELECTOR") {
            self.login_confirm_selector = v;
        }
        if let Some(ms) = parse_var::<u64>(lookup, "HTTP_TIMEOUT_MS", "u64")? {
            self.http_timeout = Duration::from_millis(ms);
        }
        if let Some(id) = parse_var(lookup, "PROPOSAL_CREATOR_ID", "i32")? {
            self.creator_filter = Some(id);
        }
        if let Some(v) = lookup("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = lookup("WARN_FILE") {
            self.warn_file = v;
        }
        if let Some(v) = parse_var(lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.credentials.username.is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "BGA_USERNAME".to_string(),
            });
        }
        if self.credentials.password.is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "BGA_PASSWORD".to_string(),
            });
        }
        self.site_base_url = self.site_base_url.trim_end_matches('/').to_string();
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
