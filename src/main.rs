use anyhow::Result;
use paced_publisher::{logger, App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load();

    // 初始化日志
    logger::init(config.as_ref().map(|c| c.verbose_logging).unwrap_or(false));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(severity = "critical", "❌ 配置无效，程序退出: {}", e);
            return Err(e.into());
        }
    };

    // 初始化并运行应用
    let app = match App::initialize(config).await {
        Ok(app) => app,
        Err(e) => {
            error!(severity = "critical", "❌ 初始化失败，程序退出: {}", e);
            return Err(e.into());
        }
    };
    app.run().await
}
