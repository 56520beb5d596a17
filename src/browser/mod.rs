pub mod connection;
pub mod credentials;
pub mod launcher;

pub use connection::connect_to_browser;
pub use credentials::StorageState;
pub use launcher::launch_browser;

use chromiumoxide::Browser;

use crate::config::Config;
use crate::error::BrowserError;

/// 按配置获取浏览器：设置了调试端口则连接，否则自行启动
pub async fn open_browser(config: &Config) -> Result<Browser, BrowserError> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await,
        None => launch_browser(config.headless, config.chrome_executable.as_deref()).await,
    }
}
