use chromiumoxide::Browser;
use futures::StreamExt;
use tracing::{debug, error, info};

use crate::error::BrowserError;
use crate::infrastructure::PageDriver;

/// 连接到已开启调试端口的浏览器，并新建一个页面
///
/// 释放时只关闭这个页面，不关闭浏览器本身
pub async fn connect_to_browser(port: u16) -> Result<PageDriver, BrowserError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed { port, source: e }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建新页面失败: {}", e);
            handler_task.abort();
            return Err(BrowserError::PageCreationFailed { source: e });
        }
    };
    debug!("已创建空白页面");

    Ok(PageDriver::new(browser, page, handler_task, false))
}
