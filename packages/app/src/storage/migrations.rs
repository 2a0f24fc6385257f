//! 数据库迁移
//!
//! 迁移按版本号升序登记在 [`MIGRATIONS`] 中，已应用的版本写入
//! `schema_migrations`。每个版本与其登记行在同一事务里提交。

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::storage::{StorageError, StorageResult};

/// 一个 schema 版本
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// 全部迁移，版本号连续递增
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "作答、复习状态、会话与设置表",
        sql: include_str!("schema.sql"),
    },
    Migration {
        version: 2,
        name: "复习队列与统计索引",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_attempts_timestamp ON attempts(timestamp);
            CREATE INDEX IF NOT EXISTS idx_attempts_mistakes ON attempts(is_correct, timestamp);
            CREATE INDEX IF NOT EXISTS idx_attempts_verb ON attempts(verb);
            CREATE INDEX IF NOT EXISTS idx_vp_review_queue ON verb_performance(next_review, difficulty_score);
        "#,
    },
];

/// 健康检查要求存在的业务表
const REQUIRED_TABLES: [&str; 4] = ["attempts", "verb_performance", "sessions", "app_settings"];

pub fn latest_version() -> i32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version    INTEGER PRIMARY KEY,
             name       TEXT NOT NULL,
             applied_at TEXT NOT NULL
         );",
    )?;
    Ok(())
}

/// 已应用的最高版本，空库为 0
pub fn schema_version(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;
    let version = conn.query_row(
        "SELECT IFNULL(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// 应用所有高于当前版本的迁移，返回迁移后的版本
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    let mut version = schema_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > version).collect();
    if pending.is_empty() {
        tracing::debug!(version, "schema up to date");
        return Ok(version);
    }

    for migration in pending {
        apply(conn, migration).inspect_err(|e| {
            tracing::error!(version = migration.version, error = %e, "migration failed");
        })?;
        tracing::info!(version = migration.version, name = migration.name, "migration applied");
        version = migration.version;
    }
    Ok(version)
}

fn apply(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| StorageError::Migration(format!("v{} {}: {}", migration.version, migration.name, e)))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![
            migration.version,
            migration.name,
            Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// 数据库健康状态
#[derive(Debug, Clone)]
pub struct DatabaseHealth {
    pub schema_version: i32,
    pub is_healthy: bool,
    pub needs_migration: bool,
    pub missing_tables: Vec<String>,
    /// 业务表行数
    pub row_counts: BTreeMap<String, i64>,
}

pub fn health_check(conn: &Connection) -> StorageResult<DatabaseHealth> {
    let version = schema_version(conn)?;

    let existing: Vec<String> = {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt.query_map([], |row| row.get(0))?.filter_map(|r| r.ok()).collect();
        names
    };

    let mut missing_tables = Vec::new();
    let mut row_counts = BTreeMap::new();
    for table in REQUIRED_TABLES {
        if !existing.iter().any(|name| name == table) {
            missing_tables.push(table.to_string());
            continue;
        }
        // 表名来自常量，不是用户输入
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        row_counts.insert(table.to_string(), count);
    }

    let latest = latest_version();
    Ok(DatabaseHealth {
        schema_version: version,
        is_healthy: missing_tables.is_empty() && version == latest,
        needs_migration: version < latest,
        missing_tables,
        row_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_consecutive() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i as i32 + 1);
        }
    }

    #[test]
    fn test_fresh_database_is_healthy() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), latest_version());

        let health = health_check(&conn).unwrap();
        assert!(health.is_healthy);
        assert!(!health.needs_migration);
        assert_eq!(health.row_counts.get("attempts"), Some(&0));
    }

    #[test]
    fn test_rerun_applies_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_broken_migration_leaves_no_trace() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_migrations_table(&conn).unwrap();

        let broken = Migration {
            version: 99,
            name: "broken",
            sql: "CREATE TABLE half_done (id INTEGER); NOT SQL;",
        };
        assert!(matches!(apply(&conn, &broken), Err(StorageError::Migration(_))));

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'half_done'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_empty_database_reports_missing_tables() {
        let conn = Connection::open_in_memory().unwrap();
        let health = health_check(&conn).unwrap();
        assert!(!health.is_healthy);
        assert!(health.needs_migration);
        assert_eq!(health.missing_tables.len(), REQUIRED_TABLES.len());
    }
}
