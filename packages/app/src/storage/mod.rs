//! SQLite 本地存储模块
//!
//! 提供：
//! - 作答记录与间隔复习状态的持久化 ([`ProgressTracker`])
//! - 练习会话汇总
//! - 学习路径等小型 JSON 文档的键值存储

// ============================================================
// 子模块声明
// ============================================================

pub mod migrations;
pub mod models;
pub mod progress;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use migrations::{health_check, run_migrations, DatabaseHealth};
pub use models::{Attempt, Session, VerbPerformance};
pub use progress::{
    CurvePoint, Mistake, ProgressTracker, ReviewItem, Statistics, TenseCount, VerbAccuracy,
    WeakArea,
};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("迁移错误: {0}")]
    Migration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("数据未找到: {0}")]
    NotFound(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// Storage - 统一存储结构体
// ============================================================

/// 统一存储结构体，持有唯一的数据库连接
pub struct Storage {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl Storage {
    /// 打开 (必要时创建) 数据库文件并运行迁移
    ///
    /// 启用 WAL 模式和外键约束，父目录不存在时自动创建。
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let connection = Connection::open(path)?;
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;

        Self::with_connection(connection, path.to_string_lossy().to_string())
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys=ON;")?;

        Self::with_connection(connection, ":memory:".to_string())
    }

    fn with_connection(connection: Connection, db_path: String) -> StorageResult<Self> {
        let conn = Arc::new(Mutex::new(connection));
        {
            let guard = conn
                .lock()
                .map_err(|e| StorageError::LockError(e.to_string()))?;
            migrations::run_migrations(&guard)?;
        }

        tracing::debug!(db_path = %db_path, "storage opened");
        Ok(Self { conn, db_path })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 获取进度追踪仓库
    pub fn progress(&self) -> ProgressTracker {
        ProgressTracker::new(Arc::clone(&self.conn))
    }

    fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    pub fn health(&self) -> StorageResult<DatabaseHealth> {
        let conn = self.get_connection()?;
        migrations::health_check(&conn)
    }

    // ========== app_settings 键值操作 ==========

    pub fn get_setting(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.get_connection()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_settings (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取 JSON 文档；键不存在时为 `None`
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        self.get_setting(key)?
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))
            })
            .transpose()
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))?;
        self.set_setting(key, &raw)
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use conjugar_algo::LearningPath;

    #[test]
    fn test_in_memory_storage() {
        let storage = Storage::in_memory().expect("Failed to create in-memory database");
        assert_eq!(storage.db_path(), ":memory:");
        assert!(storage.health().unwrap().is_healthy);
    }

    #[test]
    fn test_file_storage_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.db");

        let storage = Storage::new(&path).unwrap();
        assert!(path.exists());
        assert!(storage.db_path().ends_with("progress.db"));
    }

    #[test]
    fn test_setting_operations() {
        let storage = Storage::in_memory().unwrap();

        storage.set_setting("theme", "dark").unwrap();
        storage.set_setting("theme", "light").unwrap();
        assert_eq!(storage.get_setting("theme").unwrap().as_deref(), Some("light"));

        assert_eq!(storage.get_setting("missing").unwrap(), None);
    }

    #[test]
    fn test_json_documents() {
        let storage = Storage::in_memory().unwrap();
        assert_eq!(storage.load_json::<LearningPath>("path").unwrap(), None);

        let mut path = LearningPath::new();
        path.complete_stage(90.0);
        storage.save_json("path", &path).unwrap();

        let restored: LearningPath = storage.load_json("path").unwrap().unwrap();
        assert_eq!(restored, path);

        storage.set_setting("path", "{not json").unwrap();
        assert!(matches!(
            storage.load_json::<LearningPath>("path"),
            Err(StorageError::Serialization(_))
        ));
    }
}
