//! 浏览器能力抽象
//!
//! 会话管理只依赖这里的 trait，不直接接触 chromiumoxide，
//! 测试时可以换成脚本化的假驱动。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::BrowserError;

/// 轮询间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 页面元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css `{}`", s),
            Locator::XPath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

/// 浏览器驱动
///
/// 职责：
/// - 持有唯一的页面
/// - 暴露打开、等待、输入、点击、读取内容的能力
/// - 不认识 Proposal / Problem
#[async_trait]
pub trait SiteDriver: Send {
    /// 打开 URL
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// 在超时内等待元素出现
    ///
    /// 元素出现返回 `true`，超时返回 `false`
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration)
        -> Result<bool, BrowserError>;

    /// 向元素输入文本
    async fn type_into(&mut self, locator: &Locator, text: &str) -> Result<(), BrowserError>;

    /// 点击元素
    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// 当前渲染后的完整页面内容
    async fn content(&mut self) -> Result<String, BrowserError>;

    /// 释放浏览器资源
    async fn close(&mut self) -> Result<(), BrowserError>;

    /// 未经 `close` 就被丢弃时的同步清理，不能等待
    fn abandon(&mut self) {}

    /// 在超时内等待页面内容中出现指定文本
    async fn wait_for_text(&mut self, needle: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.content().await?.contains(needle) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// 浏览器驱动工厂
///
/// 只有真正需要会话时才启动浏览器
#[async_trait]
pub trait DriverFactory: Send + Sync {
    type Driver: SiteDriver;

    async fn acquire(&self) -> Result<Self::Driver, BrowserError>;
}
