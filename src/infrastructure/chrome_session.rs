//! chromiumoxide 实现的发帖连接
//!
//! 每个连接是一个新页面：注入 UA 与 cookie，导航到首页，然后驱动发帖界面。

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};

use crate::browser::StorageState;
use crate::error::AutomationError;
use crate::infrastructure::automation::{Connection, Connector};
use crate::models::PostContent;

/// 发帖界面的元素选择器
mod selectors {
    pub const ADD_PART_BUTTON: &str = r#"[data-testid="addButton"]"#;
    pub const POLL_BUTTON: &str = r#"[data-testid="createPollButton"]"#;
    pub const ADD_POLL_CHOICE: &str = r#"[aria-label="Add a choice"]"#;
    pub const SUBMIT_BUTTONS: [&str; 2] = [
        r#"[data-testid="tweetButtonInline"]"#,
        r#"[data-testid="tweetButton"]"#,
    ];
    pub const TOAST: &str = r#"[data-testid="toast"]"#;

    pub fn textarea(index: usize) -> String {
        format!(r#"[data-testid="tweetTextarea_{}"]"#, index)
    }

    pub fn poll_choice(index: usize) -> String {
        format!(r#"input[name="Choice{}"]"#, index + 1)
    }
}

/// 各个等待环节的时间预算
#[derive(Debug, Clone, Copy)]
struct SubmitTimeouts {
    /// 等待元素出现
    element: Duration,
    /// 等待发送按钮变为可用
    action: Duration,
    /// 等待平台确认发送成功
    confirm: Duration,
    /// 轮询间隔
    poll: Duration,
}

impl Default for SubmitTimeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(15),
            action: Duration::from_secs(15),
            confirm: Duration::from_secs(30),
            poll: Duration::from_millis(250),
        }
    }
}

/// 持有浏览器与凭据，按需创建新页面
pub struct ChromeConnector {
    browser: Option<Browser>,
    /// 连接的是外部浏览器时不负责关闭它
    owns_browser: bool,
    cookies: Vec<CookieParam>,
    user_agent: String,
    home_url: String,
    timeouts: SubmitTimeouts,
}

impl ChromeConnector {
    pub fn new(
        browser: Browser,
        owns_browser: bool,
        credentials: &StorageState,
        user_agent: impl Into<String>,
        home_url: impl Into<String>,
    ) -> Self {
        Self {
            browser: Some(browser),
            owns_browser,
            cookies: credentials.cookie_params(),
            user_agent: user_agent.into(),
            home_url: home_url.into(),
            timeouts: SubmitTimeouts::default(),
        }
    }
}

#[async_trait]
impl Connector for ChromeConnector {
    type Connection = ChromeConnection;

    async fn connect(&self) -> Result<ChromeConnection, AutomationError> {
        let browser = self.browser.as_ref().ok_or(AutomationError::Closed)?;

        debug!("创建新页面并注入会话凭据 ({} 个 cookie)", self.cookies.len());
        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await?;
        page.execute(SetCookiesParams::new(self.cookies.clone()))
            .await?;
        page.goto(self.home_url.as_str()).await?;
        info!("✓ 页面已就绪: {}", self.home_url);

        Ok(ChromeConnection {
            page,
            home_url: self.home_url.clone(),
            timeouts: self.timeouts,
        })
    }

    async fn shutdown(&mut self) {
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        if !self.owns_browser {
            debug!("外部浏览器保持运行");
            return;
        }
        match browser.close().await {
            Ok(_) => info!("浏览器已关闭"),
            Err(e) => warn!("关闭浏览器失败: {}", e),
        }
    }
}

/// 一个已登录的页面
pub struct ChromeConnection {
    page: Page,
    home_url: String,
    timeouts: SubmitTimeouts,
}

impl ChromeConnection {
    /// 轮询直到任一选择器命中；连接层错误立即返回，超出预算视为硬超时
    async fn wait_for_any(
        &self,
        selectors: &[&str],
        budget: Duration,
    ) -> Result<Element, AutomationError> {
        let deadline = Instant::now() + budget;
        loop {
            for selector in selectors {
                match self.page.find_element(*selector).await {
                    Ok(element) => return Ok(element),
                    Err(e) if is_connection_loss(&e) => return Err(e.into()),
                    Err(_) => {}
                }
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Timeout {
                    what: selectors.join(" | "),
                });
            }
            sleep(self.timeouts.poll).await;
        }
    }

    async fn wait_for(&self, selector: &str) -> Result<Element, AutomationError> {
        self.wait_for_any(&[selector], self.timeouts.element).await
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), AutomationError> {
        let element = self.wait_for(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn fill_poll(&self, options: &[String]) -> Result<(), AutomationError> {
        self.wait_for(selectors::POLL_BUTTON).await?.click().await?;
        for (index, option) in options.iter().enumerate() {
            // 默认只有两个选项框
            if index >= 2 {
                self.wait_for(selectors::ADD_POLL_CHOICE)
                    .await?
                    .click()
                    .await?;
            }
            self.fill(&selectors::poll_choice(index), option).await?;
        }
        Ok(())
    }

    /// 等待发送按钮可用后点击；始终不可用则是永久失败
    async fn click_submit(&self) -> Result<(), AutomationError> {
        let deadline = Instant::now() + self.timeouts.action;
        loop {
            let button = self
                .wait_for_any(&selectors::SUBMIT_BUTTONS, self.timeouts.element)
                .await?;
            if !is_disabled(&button).await? {
                button.click().await?;
                debug!("已点击发送按钮");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!("发送按钮在 {:?} 内始终不可用", self.timeouts.action);
                return Err(AutomationError::ActionDisabled);
            }
            sleep(self.timeouts.poll).await;
        }
    }

    /// 出现提示条，或输入框被清空，即视为发送成功
    async fn wait_for_confirmation(&self) -> Result<(), AutomationError> {
        let deadline = Instant::now() + self.timeouts.confirm;
        let first_area = selectors::textarea(0);
        loop {
            if self.page.find_element(selectors::TOAST).await.is_ok() {
                return Ok(());
            }
            match self.page.find_element(first_area.as_str()).await {
                Ok(area) => {
                    let text = area.inner_text().await?.unwrap_or_default();
                    if text.trim().is_empty() {
                        return Ok(());
                    }
                }
                Err(e) if is_connection_loss(&e) => return Err(e.into()),
                Err(_) => {}
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Timeout {
                    what: "发送确认".to_string(),
                });
            }
            sleep(self.timeouts.poll).await;
        }
    }
}

#[async_trait]
impl Connection for ChromeConnection {
    async fn submit(&mut self, post: &PostContent) -> Result<(), AutomationError> {
        self.page.goto(self.home_url.as_str()).await?;

        for (index, body) in post.bodies().iter().enumerate() {
            if index > 0 {
                self.wait_for(selectors::ADD_PART_BUTTON)
                    .await?
                    .click()
                    .await?;
            }
            self.fill(&selectors::textarea(index), body).await?;
        }

        if let PostContent::Poll { options, .. } = post {
            self.fill_poll(options).await?;
        }

        self.click_submit().await?;
        self.wait_for_confirmation().await
    }

    async fn capture_diagnostics(&mut self, dir: &Path, label: &str) {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("无法创建诊断目录 {}: {}", dir.display(), e);
            return;
        }
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");

        let png = dir.join(format!("{}-{}.png", label, stamp));
        match self
            .page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), &png)
            .await
        {
            Ok(_) => info!("📸 已保存截图: {}", png.display()),
            Err(e) => warn!("保存截图失败: {}", e),
        }

        let html = dir.join(format!("{}-{}.html", label, stamp));
        match self.page.content().await {
            Ok(content) => {
                if let Err(e) = tokio::fs::write(&html, content).await {
                    warn!("保存页面 HTML 失败: {}", e);
                }
            }
            Err(e) => warn!("读取页面 HTML 失败: {}", e),
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("关闭页面失败（忽略）: {}", e);
        }
    }
}

/// 连接已经不可用（而不仅仅是元素还没出现）
fn is_connection_loss(err: &CdpError) -> bool {
    matches!(
        err,
        CdpError::Ws(_) | CdpError::NoResponse | CdpError::ChannelSendError(_)
    )
}

async fn is_disabled(element: &Element) -> Result<bool, AutomationError> {
    let aria = element.attribute("aria-disabled").await?;
    let disabled = element.attribute("disabled").await?;
    Ok(aria.as_deref() == Some("true") || disabled.is_some())
}
