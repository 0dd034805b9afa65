//! 浏览器获取
//!
//! 启动（无头 / 带窗口）或连接已有浏览器，由 `DriverMode` 决定

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

use async_trait::async_trait;

use crate::config::{Config, DriverMode};
use crate::error::BrowserError;
use crate::infrastructure::{DriverFactory, PageDriver};

/// 按配置获取 chromiumoxide 页面驱动
#[derive(Debug, Clone)]
pub struct ChromeDriverFactory {
    mode: DriverMode,
    debug_port: u16,
    executable: Option<String>,
}

impl ChromeDriverFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: config.driver_mode,
            debug_port: config.browser_debug_port,
            executable: config.chrome_executable.clone(),
        }
    }
}

#[async_trait]
impl DriverFactory for ChromeDriverFactory {
    type Driver = PageDriver;

    async fn acquire(&self) -> Result<PageDriver, BrowserError> {
        match self.mode {
            DriverMode::Headless => launch_browser(true, self.executable.as_deref()).await,
            DriverMode::Windowed => launch_browser(false, self.executable.as_deref()).await,
            DriverMode::Connect => connect_to_browser(self.debug_port).await,
        }
    }
}
