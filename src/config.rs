use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::KindWeights;

/// 节奏档位：决定两次发布之间的默认停顿区间
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingProfile {
    /// 紧凑的连发（45 秒 - 2 分钟）
    Burst,
    /// 慢节奏，更像真人（15 分钟 - 2 小时）
    Relaxed,
}

impl PacingProfile {
    /// 默认停顿区间（秒）
    pub fn pause_bounds(self) -> (u64, u64) {
        match self {
            PacingProfile::Burst => (45, 120),
            PacingProfile::Relaxed => (15 * 60, 2 * 60 * 60),
        }
    }
}

impl FromStr for PacingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "burst" => Ok(PacingProfile::Burst),
            "relaxed" => Ok(PacingProfile::Relaxed),
            other => Err(format!("未知的节奏档位: {}", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 帖子语言
    pub language: String,
    /// 帖子语气
    pub tone: String,

    // --- 文件 ---
    /// 会话凭据文件（storage_state JSON）
    pub auth_file: PathBuf,
    /// 话题库文件
    pub prompts_file: PathBuf,
    /// 已发布帖子的审计日志
    pub posted_log: PathBuf,
    /// 失败截图 / HTML 存放目录
    pub diagnostics_dir: PathBuf,

    // --- 浏览器 ---
    pub home_url: String,
    pub user_agent: String,
    pub headless: bool,
    /// 设置后连接已运行的浏览器，而不是自行启动
    pub browser_debug_port: Option<u16>,
    pub chrome_executable: Option<PathBuf>,

    // --- 作息 ---
    pub active_start_hour: u32,
    pub active_end_hour: u32,
    pub daily_goal_min: u32,
    pub daily_goal_max: u32,
    pub burst_min: u32,
    pub burst_max: u32,
    pub pacing_profile: PacingProfile,
    /// 覆盖节奏档位的停顿下限
    pub pause_min_secs: Option<u64>,
    /// 覆盖节奏档位的停顿上限
    pub pause_max_secs: Option<u64>,
    /// 发布失败后的额外冷却
    pub failure_cooldown_secs: u64,
    /// 话题库为空时的等待
    pub idle_backoff_secs: u64,

    // --- 话题库 ---
    pub min_topics: usize,
    pub discovery_batch: usize,

    // --- 发布 ---
    pub max_attempts: u32,
    pub max_post_chars: usize,
    pub max_thread_parts: usize,
    pub max_poll_options: usize,
    pub poll_option_chars: usize,
    pub kind_weights: KindWeights,
    pub promo_url: Option<String>,

    /// 固定随机种子（可复现的运行）
    pub rng_seed: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.0-flash".to_string(),
            language: "en".to_string(),
            tone: "direct".to_string(),
            auth_file: PathBuf::from("playwright_auth.json"),
            prompts_file: PathBuf::from("prompts.txt"),
            posted_log: PathBuf::from("posted_tweets.log"),
            diagnostics_dir: PathBuf::from("diagnostics"),
            home_url: "https://x.com/home".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
                .to_string(),
            headless: true,
            browser_debug_port: None,
            chrome_executable: None,
            active_start_hour: 6,
            active_end_hour: 23,
            daily_goal_min: 100,
            daily_goal_max: 250,
            burst_min: 30,
            burst_max: 50,
            pacing_profile: PacingProfile::Burst,
            pause_min_secs: None,
            pause_max_secs: None,
            failure_cooldown_secs: 60,
            idle_backoff_secs: 600,
            min_topics: 10,
            discovery_batch: 20,
            max_attempts: 2,
            max_post_chars: 280,
            max_thread_parts: 4,
            max_poll_options: 4,
            poll_option_chars: 25,
            kind_weights: KindWeights::default(),
            promo_url: None,
            rng_seed: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 完整加载流程：默认值 → TOML 文件 → 环境变量 → 校验
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("PUBLISHER_CONFIG").ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or("publisher.toml"));

        let mut config = if path.exists() {
            Self::from_toml_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::File {
                path: path.display().to_string(),
                reason: "文件不存在".to_string(),
            });
        } else {
            Self::default()
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|reason| ConfigError::File {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(key) = env_string("LLM_API_KEY").or_else(|| env_string("GEMINI_API_KEY")) {
            self.llm_api_key = key;
        }
        override_string(&mut self.llm_api_base_url, "LLM_API_BASE_URL");
        override_string(&mut self.llm_model_name, "LLM_MODEL_NAME");
        override_string(&mut self.language, "POST_LANGUAGE");
        override_string(&mut self.tone, "POST_TONE");

        override_path(&mut self.auth_file, "AUTH_FILE");
        override_path(&mut self.prompts_file, "PROMPTS_FILE");
        override_path(&mut self.posted_log, "POSTED_LOG");
        override_path(&mut self.diagnostics_dir, "DIAGNOSTICS_DIR");

        override_string(&mut self.home_url, "HOME_URL");
        override_string(&mut self.user_agent, "USER_AGENT");
        override_parsed(&mut self.headless, "HEADLESS")?;
        if let Some(port) = env_parsed::<u16>("BROWSER_DEBUG_PORT")? {
            self.browser_debug_port = Some(port);
        }
        if let Some(path) = env_string("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(PathBuf::from(path));
        }

        override_parsed(&mut self.active_start_hour, "ACTIVE_START_HOUR")?;
        override_parsed(&mut self.active_end_hour, "ACTIVE_END_HOUR")?;
        override_parsed(&mut self.daily_goal_min, "DAILY_GOAL_MIN")?;
        override_parsed(&mut self.daily_goal_max, "DAILY_GOAL_MAX")?;
        override_parsed(&mut self.burst_min, "BURST_MIN")?;
        override_parsed(&mut self.burst_max, "BURST_MAX")?;
        override_parsed(&mut self.pacing_profile, "PACING_PROFILE")?;
        if let Some(secs) = env_parsed::<u64>("PAUSE_MIN_SECS")? {
            self.pause_min_secs = Some(secs);
        }
        if let Some(secs) = env_parsed::<u64>("PAUSE_MAX_SECS")? {
            self.pause_max_secs = Some(secs);
        }
        override_parsed(&mut self.failure_cooldown_secs, "FAILURE_COOLDOWN_SECS")?;
        override_parsed(&mut self.idle_backoff_secs, "IDLE_BACKOFF_SECS")?;

        override_parsed(&mut self.min_topics, "MIN_TOPICS")?;
        override_parsed(&mut self.discovery_batch, "DISCOVERY_BATCH")?;

        override_parsed(&mut self.max_attempts, "MAX_ATTEMPTS")?;
        override_parsed(&mut self.max_post_chars, "MAX_POST_CHARS")?;
        override_parsed(&mut self.kind_weights, "KIND_WEIGHTS")?;
        if let Some(url) = env_string("PROMO_URL") {
            self.promo_url = Some(url);
        }

        if let Some(seed) = env_parsed::<u64>("RANDOM_SEED")? {
            self.rng_seed = Some(seed);
        }
        override_parsed(&mut self.verbose_logging, "VERBOSE_LOGGING")?;
        Ok(())
    }

    /// 校验配置的一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "LLM_API_KEY".to_string(),
            });
        }
        if self.active_start_hour > 23 || self.active_end_hour > 23 {
            return Err(invalid("active_start_hour/active_end_hour", "小时必须在 0-23 之间"));
        }
        if self.active_start_hour == self.active_end_hour {
            return Err(invalid("active_start_hour/active_end_hour", "起止小时不能相同"));
        }
        if self.daily_goal_min > self.daily_goal_max {
            return Err(invalid("daily_goal_min/daily_goal_max", "下限大于上限"));
        }
        if self.daily_goal_max == 0 {
            return Err(invalid("daily_goal_max", "每日目标必须大于 0"));
        }
        if self.burst_min == 0 || self.burst_min > self.burst_max {
            return Err(invalid("burst_min/burst_max", "连发数量区间不合法"));
        }
        let (pause_min, pause_max) = self.pause_bounds();
        if pause_min > pause_max {
            return Err(invalid("pause_min_secs/pause_max_secs", "下限大于上限"));
        }
        if !(1..=3).contains(&self.max_attempts) {
            return Err(invalid("max_attempts", "必须在 1-3 之间"));
        }
        if self.max_post_chars == 0 {
            return Err(invalid("max_post_chars", "必须大于 0"));
        }
        if self.max_thread_parts < 2 || self.max_poll_options < 2 {
            return Err(invalid("max_thread_parts/max_poll_options", "至少为 2"));
        }
        if self.kind_weights.effective(self.promo_url.is_some()).total() == 0 {
            return Err(invalid("kind_weights", "所有帖子类型的权重都为 0"));
        }
        Ok(())
    }

    /// 实际使用的停顿区间（秒），显式配置优先于节奏档位
    pub fn pause_bounds(&self) -> (u64, u64) {
        let (min, max) = self.pacing_profile.pause_bounds();
        (
            self.pause_min_secs.unwrap_or(min),
            self.pause_max_secs.unwrap_or(max),
        )
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::ParseFailed {
                name: name.to_string(),
                value,
                expected: std::any::type_name::<T>().to_string(),
            }),
        None => Ok(None),
    }
}

fn override_string(slot: &mut String, name: &str) {
    if let Some(value) = env_string(name) {
        *slot = value;
    }
}

fn override_path(slot: &mut PathBuf, name: &str) {
    if let Some(value) = env_string(name) {
        *slot = PathBuf::from(value);
    }
}

fn override_parsed<T: FromStr>(slot: &mut T, name: &str) -> Result<(), ConfigError> {
    if let Some(value) = env_parsed::<T>(name)? {
        *slot = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            llm_api_key: "test-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_needs_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_toml_fields_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            llm_api_key = "abc"
            burst_min = 2
            burst_max = 4
            pacing_profile = "relaxed"

            [kind_weights]
            single = 1
            thread = 0
            poll = 0
            link = 0
            promo = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.llm_api_key, "abc");
        assert_eq!((config.burst_min, config.burst_max), (2, 4));
        assert_eq!(config.pause_bounds(), (900, 7200));
        assert_eq!(config.max_post_chars, 280);
        assert_eq!(config.kind_weights.thread, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_pause_overrides_profile() {
        let config = Config {
            pause_min_secs: Some(5),
            ..valid_config()
        };
        assert_eq!(config.pause_bounds(), (5, 120));
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let config = Config {
            daily_goal_min: 10,
            daily_goal_max: 5,
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = Config {
            burst_min: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = Config {
            active_start_hour: 8,
            active_end_hour: 8,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_retry_attempts() {
        for attempts in [0, 4] {
            let config = Config {
                max_attempts: attempts,
                ..valid_config()
            };
            assert!(config.validate().is_err(), "attempts={}", attempts);
        }
    }

    #[test]
    fn test_promo_only_weights_need_promo_url() {
        let config = Config {
            kind_weights: KindWeights {
                single: 0,
                thread: 0,
                poll: 0,
                link: 0,
                promo: 10,
            },
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = Config {
            promo_url: Some("https://example.com".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    // 环境变量是进程级共享状态，相关断言放在同一个测试里
    #[test]
    fn test_env_overrides_and_explicit_config_path() {
        std::env::set_var("POST_TONE", "dry");
        std::env::set_var("MAX_POST_CHARS", " 200 ");
        let mut config = valid_config();
        config.apply_env().unwrap();
        assert_eq!(config.tone, "dry");
        assert_eq!(config.max_post_chars, 200);

        std::env::set_var("MAX_POST_CHARS", "lots");
        let err = valid_config().apply_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ParseFailed { ref name, .. } if name == "MAX_POST_CHARS"
        ));
        std::env::remove_var("MAX_POST_CHARS");
        std::env::remove_var("POST_TONE");

        std::env::set_var("PUBLISHER_CONFIG", "/definitely/not/here/publisher.toml");
        let err = Config::load().unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
        std::env::remove_var("PUBLISHER_CONFIG");
    }

    #[test]
    fn test_pacing_profile_parse() {
        assert_eq!("Relaxed".parse::<PacingProfile>().unwrap(), PacingProfile::Relaxed);
        assert!("fast".parse::<PacingProfile>().is_err());
    }
}
