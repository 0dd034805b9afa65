//! 会话管理 - 业务能力层
//!
//! 持有一次运行中唯一的外部站点登录会话：
//! - 登录是多步状态机，每一步都等待特定元素出现（有超时，不用固定延时）
//! - 登录失败是致命错误，不重试
//! - 登录后打开对局回放页面并选择视角，日志才会出现在页面中

use std::fmt;

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials, StepTimeouts};
use crate::error::{AuthError, LoginStep, NavigationError};
use crate::infrastructure::{Locator, SiteDriver};
use crate::services::log_extractor::LOG_MARKER;

/// 账号输入框
pub const IDENTIFIER_INPUT: &str = "form input[name='email'].text-bga-input-null";
/// 密码输入框
pub const SECRET_INPUT: &str = "form input[type='password'].text-bga-input-null";
/// "下一步"按钮
pub const NEXT_BUTTON: &str = "//a[text()='Next']";
/// "登录"按钮
pub const LOGIN_BUTTON: &str = "//a[text()='Login']";
/// 回放页面的视角选择按钮
pub const VIEWPOINT_SELECTOR: &str = ".choosePlayerLink";

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 外部站点会话
///
/// 只存在于内存中，运行结束或出现致命错误时必须调用 `release`
pub struct Session<D: SiteDriver> {
    driver: D,
    state: SessionState,
    released: bool,
}

impl<D: SiteDriver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: SessionState::Unauthenticated,
            released: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated && !self.released
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// 释放浏览器资源，可重复调用
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.driver.close().await {
            warn!("释放浏览器会话失败: {}", e);
        }
    }
}

impl<D: SiteDriver> Drop for Session<D> {
    fn drop(&mut self) {
        // panic 或 future 被取消时走不到 release
        if !self.released {
            self.released = true;
            warn!("会话在释放前被丢弃");
            self.driver.abandon();
        }
    }
}

/// 渲染后的对局页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub table_id: String,
    pub content: String,
}

/// 会话管理服务
pub struct SessionManager {
    site_base_url: String,
    timeouts: StepTimeouts,
    confirm: Locator,
}

impl SessionManager {
    pub fn new(config: &Config) -> Self {
        Self {
            site_base_url: config.site_base_url.trim_end_matches('/').to_string(),
            timeouts: config.timeouts,
            confirm: Locator::css(config.login_confirm_selector.clone()),
        }
    }

    /// 登录
    ///
    /// 成功后会话进入 `Authenticated`，任何一步失败都进入 `Failed`
    pub async fn authenticate<D: SiteDriver>(
        &self,
        session: &mut Session<D>,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        if session.state != SessionState::Unauthenticated || session.released {
            return Err(AuthError::InvalidState {
                state: session.state.to_string(),
            });
        }

        info!("🔐 正在登录外部站点: {}", credentials.username);
        session.state = SessionState::Authenticating;

        match self.login(&mut session.driver, credentials).await {
            Ok(()) => {
                session.state = SessionState::Authenticated;
                info!("✓ 登录成功");
                Ok(())
            }
            Err(e) => {
                session.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn login<D: SiteDriver>(
        &self,
        driver: &mut D,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        let login_url = format!("{}/account", self.site_base_url);
        driver
            .goto(&login_url)
            .await
            .map_err(|source| AuthError::Driver {
                step: LoginStep::OpenLoginPage,
                source,
            })?;

        let identifier = Locator::css(IDENTIFIER_INPUT);
        self.await_element(driver, LoginStep::EnterIdentifier, &identifier)
            .await?;
        driver
            .type_into(&identifier, &credentials.username)
            .await
            .map_err(|source| AuthError::Driver {
                step: LoginStep::EnterIdentifier,
                source,
            })?;

        let next = Locator::xpath(NEXT_BUTTON);
        self.await_element(driver, LoginStep::Advance, &next).await?;
        driver.click(&next).await.map_err(|source| AuthError::Driver {
            step: LoginStep::Advance,
            source,
        })?;

        let secret = Locator::css(SECRET_INPUT);
        self.await_element(driver, LoginStep::EnterSecret, &secret)
            .await?;
        driver
            .type_into(&secret, &credentials.password)
            .await
            .map_err(|source| AuthError::Driver {
                step: LoginStep::EnterSecret,
                source,
            })?;

        let login = Locator::xpath(LOGIN_BUTTON);
        self.await_element(driver, LoginStep::Confirm, &login).await?;
        driver.click(&login).await.map_err(|source| AuthError::Driver {
            step: LoginStep::Confirm,
            source,
        })?;

        let confirmed = driver
            .wait_for(&self.confirm, self.timeouts.login_confirm)
            .await
            .map_err(|source| AuthError::Driver {
                step: LoginStep::AwaitLoggedIn,
                source,
            })?;
        if !confirmed {
            return Err(AuthError::Rejected {
                reason: format!(
                    "{:?} 内未出现登录标志 {}",
                    self.timeouts.login_confirm, self.confirm
                ),
            });
        }

        Ok(())
    }

    async fn await_element<D: SiteDriver>(
        &self,
        driver: &mut D,
        step: LoginStep,
        locator: &Locator,
    ) -> Result<(), AuthError> {
        debug!("登录步骤 [{}]: 等待 {}", step, locator);
        let timeout = self.timeouts.login_step;
        let appeared = driver
            .wait_for(locator, timeout)
            .await
            .map_err(|source| AuthError::Driver { step, source })?;
        if appeared {
            Ok(())
        } else {
            Err(AuthError::StepTimedOut {
                step,
                locator: locator.clone(),
                timeout,
            })
        }
    }

    /// 对局回放页面地址
    pub fn table_url(&self, table_id: &str) -> Result<Url, NavigationError> {
        Url::parse_with_params(
            &format!("{}/gamereview", self.site_base_url),
            &[("table", table_id)],
        )
        .map_err(|e| NavigationError::InvalidUrl {
            table_id: table_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// 打开对局回放页面并选择视角
    ///
    /// 选择视角后等待日志出现；超时仍返回页面内容，由提取阶段判断
    pub async fn navigate_to_table<D: SiteDriver>(
        &self,
        session: &mut Session<D>,
        table_id: &str,
    ) -> Result<RenderedPage, NavigationError> {
        if !session.is_authenticated() {
            return Err(NavigationError::NotAuthenticated {
                table_id: table_id.to_string(),
            });
        }

        let url = self.table_url(table_id)?.to_string();
        let driver = &mut session.driver;
        let load_failed = |source| NavigationError::LoadFailed {
            url: url.clone(),
            source,
        };

        driver.goto(&url).await.map_err(load_failed)?;

        let viewpoint = Locator::css(VIEWPOINT_SELECTOR);
        let timeout = self.timeouts.viewpoint;
        if !driver.wait_for(&viewpoint, timeout).await.map_err(load_failed)? {
            return Err(NavigationError::ViewpointMissing {
                table_id: table_id.to_string(),
                timeout,
            });
        }
        driver
            .click(&viewpoint)
            .await
            .map_err(|source| NavigationError::ViewpointSelectFailed {
                table_id: table_id.to_string(),
                source,
            })?;

        let ready = driver
            .wait_for_text(LOG_MARKER, self.timeouts.log_ready)
            .await
            .map_err(load_failed)?;
        if !ready {
            warn!(
                "对局 {} 选择视角后 {:?} 内未出现对局日志",
                table_id, self.timeouts.log_ready
            );
        }

        let content = driver.content().await.map_err(load_failed)?;
        Ok(RenderedPage {
            table_id: table_id.to_string(),
            content,
        })
    }
}
