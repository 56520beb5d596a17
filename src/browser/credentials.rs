//! 会话凭据
//!
//! 读取一次性交互登录后导出的 storage_state JSON，转换为 CDP 可注入的 cookie

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// storage_state 文件结构（只关心 cookies）
#[derive(Debug, Clone, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Unix 秒；-1 表示会话 cookie
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

impl StorageState {
    /// 从文件加载；文件不存在或无法解析都属于启动失败
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingCredentialStore {
                path: path.display().to_string(),
            });
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidCredentialStore {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let state = Self::parse(&content).map_err(|e| ConfigError::InvalidCredentialStore {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if state.cookies.is_empty() {
            warn!("⚠️ 会话凭据文件中没有 cookie，登录状态可能无效: {}", path.display());
        }
        debug!("读取到 {} 个 cookie", state.cookies.len());
        Ok(state)
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// 转换为 `Network.setCookies` 的参数，跳过无法构造的条目
    pub fn cookie_params(&self) -> Vec<CookieParam> {
        self.cookies
            .iter()
            .filter_map(|cookie| match cookie.to_param() {
                Ok(param) => Some(param),
                Err(e) => {
                    warn!("跳过无效 cookie {}: {}", cookie.name, e);
                    None
                }
            })
            .collect()
    }
}

impl StoredCookie {
    fn to_param(&self) -> Result<CookieParam, String> {
        let mut builder = CookieParam::builder()
            .name(self.name.clone())
            .value(self.value.clone())
            .domain(self.domain.clone())
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(expires) = self.expires.filter(|e| *e > 0.0) {
            builder = builder.expires(TimeSinceEpoch::new(expires));
        }
        if let Some(same_site) = self.same_site.as_deref().and_then(parse_same_site) {
            builder = builder.same_site(same_site);
        }
        builder.build()
    }
}

fn parse_same_site(value: &str) -> Option<CookieSameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(CookieSameSite::Strict),
        "lax" => Some(CookieSameSite::Lax),
        "none" => Some(CookieSameSite::None),
        _ => None,
    }
}
