//! 行式存储 - 业务能力层
//!
//! 话题库与审计日志都是"追加一行 / 读出全部行"的平面文件，这里抽象成仓储接口

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// 只追加的行式存储
#[async_trait]
pub trait LineStore: Send + Sync {
    /// 读出所有非空行（已去除首尾空白）
    async fn load(&self) -> Result<Vec<String>, PersistenceError>;

    /// 追加一行，返回时已经落盘
    async fn append(&self, line: &str) -> Result<(), PersistenceError>;

    /// 用于日志显示
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: LineStore + ?Sized> LineStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<Vec<String>, PersistenceError> {
        (**self).load().await
    }

    async fn append(&self, line: &str) -> Result<(), PersistenceError> {
        (**self).append(line).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// 基于文件的实现
pub struct FileLineStore {
    path: PathBuf,
}

impl FileLineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl LineStore for FileLineStore {
    async fn load(&self) -> Result<Vec<String>, PersistenceError> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            warn!("{} 不存在，创建空文件", self.display());
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|source| PersistenceError::WriteFailed {
                    path: self.display(),
                    source,
                })?;
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path)
                .await
                .map_err(|source| PersistenceError::ReadFailed {
                    path: self.display(),
                    source,
                })?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn append(&self, line: &str) -> Result<(), PersistenceError> {
        let write_failed = |source| PersistenceError::WriteFailed {
            path: self.display(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_failed)?;
        file.write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;

        debug!("追加一行到 {}", self.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.display()
    }
}

/// 内存实现，可以模拟写入失败
#[derive(Default)]
pub struct MemoryLineStore {
    lines: Mutex<Vec<String>>,
    fail_writes: bool,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            fail_writes: false,
        }
    }

    /// 之后所有追加都返回写入错误
    pub fn failing() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    /// 当前保存的所有行
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LineStore for MemoryLineStore {
    async fn load(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self
            .lines()
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    async fn append(&self, line: &str) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::WriteFailed {
                path: self.describe(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
