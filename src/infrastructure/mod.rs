//! 基础设施层
//!
//! 持有稀缺资源（浏览器与页面），只向上暴露"打开连接 / 提交帖子 / 留存现场 / 关闭"能力

pub mod automation;
pub mod chrome_session;

pub use automation::{Connection, Connector};
pub use chrome_session::{ChromeConnection, ChromeConnector};
