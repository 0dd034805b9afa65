//! 页面驱动 - 基础设施层
//!
//! 持有唯一的 Browser / Page 资源，基于 chromiumoxide 实现 `SiteDriver`

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::site_driver::{Locator, SiteDriver, POLL_INTERVAL};
use crate::error::BrowserError;

/// 页面驱动
pub struct PageDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// 浏览器由本程序启动（connect 模式下只关闭自己的页面）
    owns_browser: bool,
    closed: bool,
}

impl PageDriver {
    pub fn new(browser: Browser, page: Page, handler: JoinHandle<()>, owns_browser: bool) -> Self {
        Self {
            browser,
            page,
            handler,
            owns_browser,
            closed: false,
        }
    }

    /// 获取 page 的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn find(&self, locator: &Locator) -> Result<Element, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        let element = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await?,
            // 没有匹配时按 NotFound 处理
            Locator::XPath(expr) => self
                .page
                .find_xpaths(expr.as_str())
                .await?
                .into_iter()
                .next()
                .ok_or(CdpError::NotFound)?,
        };
        Ok(element)
    }
}

/// 元素尚未渲染
///
/// 浏览器正常应答但找不到节点时继续轮询；连接断开等其他错误直接返回
fn is_not_rendered(err: &CdpError) -> bool {
    matches!(err, CdpError::NotFound | CdpError::Chrome(_))
}

#[async_trait]
impl SiteDriver for PageDriver {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        debug!("打开页面: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(locator).await {
                Ok(_) => {
                    debug!("元素已出现: {}", locator);
                    return Ok(true);
                }
                Err(BrowserError::Cdp(e)) if is_not_rendered(&e) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn type_into(&mut self, locator: &Locator, text: &str) -> Result<(), BrowserError> {
        let element = self.find(locator).await?;
        element.click().await?.type_str(text).await?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        let element = self.find(locator).await?;
        element.click().await?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        Ok(self.page.content().await?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = if self.owns_browser {
            match self.browser.close().await {
                Ok(_) => {
                    if let Err(e) = self.browser.wait().await {
                        warn!("等待浏览器进程退出失败: {}", e);
                    }
                    Ok(())
                }
                Err(e) => Err(BrowserError::Cdp(e)),
            }
        } else {
            self.page.clone().close().await.map_err(BrowserError::Cdp)
        };

        self.handler.abort();
        debug!("浏览器会话已释放");
        result
    }

    fn abandon(&mut self) {
        if !self.closed {
            self.closed = true;
            self.handler.abort();
            warn!("浏览器会话未正常释放，已停止事件处理");
        }
    }
}
