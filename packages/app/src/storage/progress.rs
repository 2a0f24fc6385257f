//! 学习进度与间隔复习
//!
//! 每次作答写入 `attempts`，同时在同一事务中用 [`conjugar_algo::srs`]
//! 更新 `verb_performance` 的计数、难度分数和下一次复习时间。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use conjugar_algo::srs::{self, BEST_VERB_MIN_ATTEMPTS, WEAK_AREA_MIN_ATTEMPTS};
use conjugar_algo::{Person, ReviewUpdate, Tense};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::models::{
    encode_verbs, format_datetime, parse_datetime, Attempt, Session, VerbPerformance,
};
use crate::storage::{StorageError, StorageResult};

/// 统计中列出的最佳动词数
const BEST_VERBS_LIMIT: i64 = 5;

// ============================================================
// 查询结果
// ============================================================

/// 待复习项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub verb: String,
    pub tense: String,
    pub person: i64,
    pub difficulty_score: f64,
    pub correct_count: i64,
    pub incorrect_count: i64,
}

/// 薄弱项，`accuracy` 为 0-1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
    pub verb: String,
    pub tense: String,
    pub person: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub accuracy: f64,
    pub difficulty_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbAccuracy {
    pub verb: String,
    /// 百分比
    pub accuracy: f64,
    pub attempts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenseCount {
    pub tense: String,
    pub count: i64,
}

/// 总体统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_attempts: i64,
    pub correct_attempts: i64,
    pub unique_verbs: i64,
    pub unique_tenses: i64,
    /// 百分比
    pub accuracy: f64,
    pub best_verbs: Vec<VerbAccuracy>,
    pub tense_distribution: Vec<TenseCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub verb: String,
    pub tense: String,
    pub person: i64,
    pub user_answer: String,
    pub correct_answer: String,
    pub timestamp: DateTime<Utc>,
}

/// 学习曲线上的一天
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub attempts: i64,
    pub correct: i64,
    /// 百分比
    pub accuracy: f64,
}

// ============================================================
// ProgressTracker
// ============================================================

/// 进度追踪仓库
pub struct ProgressTracker {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressTracker {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    // ========== 作答 ==========

    /// 记录一次作答并重新调度该项
    pub fn record_attempt(
        &self,
        verb: &str,
        tense: Tense,
        person: Person,
        user_answer: &str,
        correct_answer: &str,
        is_correct: bool,
    ) -> StorageResult<ReviewUpdate> {
        let attempt = Attempt::new(
            verb,
            tense,
            person,
            user_answer,
            correct_answer,
            is_correct,
            Utc::now(),
        );
        self.record(&attempt)
    }

    /// 以 `attempt.timestamp` 为当前时间记录作答
    ///
    /// 作答行和复习状态在同一个事务里写入，任一失败都不会留下半条记录。
    pub fn record(&self, attempt: &Attempt) -> StorageResult<ReviewUpdate> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        attempt.insert(&tx)?;

        let previous = find_performance(&tx, &attempt.verb, &attempt.tense, attempt.person)?;
        let update = srs::schedule(
            previous.as_ref().map(VerbPerformance::review_state),
            attempt.is_correct,
        );

        let (correct, incorrect) = previous
            .as_ref()
            .map(|p| (p.correct_count, p.incorrect_count))
            .unwrap_or((0, 0));
        let now = attempt.timestamp;

        VerbPerformance {
            verb: attempt.verb.clone(),
            tense: attempt.tense.clone(),
            person: attempt.person,
            correct_count: correct + i64::from(attempt.is_correct),
            incorrect_count: incorrect + i64::from(!attempt.is_correct),
            last_seen: Some(now),
            next_review: Some(now + Duration::days(i64::from(update.interval_days))),
            difficulty_score: update.difficulty_score,
            interval_days: i64::from(update.interval_days),
        }
        .upsert(&tx)?;

        tx.commit()?;

        tracing::debug!(
            verb = %attempt.verb,
            tense = %attempt.tense,
            person = attempt.person,
            correct = attempt.is_correct,
            interval_days = update.interval_days,
            difficulty = update.difficulty_score,
            "attempt recorded"
        );

        Ok(update)
    }

    pub fn get_performance(
        &self,
        verb: &str,
        tense: Tense,
        person: Person,
    ) -> StorageResult<Option<VerbPerformance>> {
        let conn = self.get_connection()?;
        find_performance(&conn, verb, tense.as_str(), person.index() as i64)
    }

    // ========== 复习队列 ==========

    /// 到期待复习的项，难度高的优先，其次到期早的优先
    pub fn get_verbs_for_review(&self, limit: usize) -> StorageResult<Vec<ReviewItem>> {
        self.get_verbs_for_review_at(limit, Utc::now())
    }

    pub fn get_verbs_for_review_at(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<ReviewItem>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT verb, tense, person, difficulty_score, correct_count, incorrect_count
            FROM verb_performance
            WHERE next_review <= ?1
            ORDER BY difficulty_score DESC, next_review ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![format_datetime(now), sql_limit(limit)], |row| {
                Ok(ReviewItem {
                    verb: row.get("verb")?,
                    tense: row.get("tense")?,
                    person: row.get("person")?,
                    difficulty_score: row.get("difficulty_score")?,
                    correct_count: row.get("correct_count")?,
                    incorrect_count: row.get("incorrect_count")?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(items)
    }

    /// 至少作答 3 次的项里正确率最低的
    pub fn get_weak_areas(&self, limit: usize) -> StorageResult<Vec<WeakArea>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT verb, tense, person, correct_count, incorrect_count, difficulty_score,
                   CAST(correct_count AS REAL) / (correct_count + incorrect_count) AS accuracy
            FROM verb_performance
            WHERE correct_count + incorrect_count >= ?1
            ORDER BY accuracy ASC, difficulty_score DESC
            LIMIT ?2
            "#,
        )?;

        let areas = stmt
            .query_map(params![WEAK_AREA_MIN_ATTEMPTS, sql_limit(limit)], |row| {
                Ok(WeakArea {
                    verb: row.get("verb")?,
                    tense: row.get("tense")?,
                    person: row.get("person")?,
                    correct_count: row.get("correct_count")?,
                    incorrect_count: row.get("incorrect_count")?,
                    accuracy: row.get("accuracy")?,
                    difficulty_score: row.get("difficulty_score")?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(areas)
    }

    // ========== 统计 ==========

    pub fn get_statistics(&self) -> StorageResult<Statistics> {
        let conn = self.get_connection()?;

        let (total_attempts, correct_attempts, unique_verbs, unique_tenses) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(is_correct), 0),
                   COUNT(DISTINCT verb),
                   COUNT(DISTINCT tense)
            FROM attempts
            "#,
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT verb,
                   CAST(SUM(is_correct) AS REAL) / COUNT(*) * 100 AS accuracy,
                   COUNT(*) AS attempts
            FROM attempts
            GROUP BY verb
            HAVING attempts >= ?1
            ORDER BY accuracy DESC, attempts DESC, verb ASC
            LIMIT ?2
            "#,
        )?;
        let best_verbs = stmt
            .query_map(params![BEST_VERB_MIN_ATTEMPTS, BEST_VERBS_LIMIT], |row| {
                Ok(VerbAccuracy {
                    verb: row.get("verb")?,
                    accuracy: row.get("accuracy")?,
                    attempts: row.get("attempts")?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn.prepare(
            r#"
            SELECT tense, COUNT(*) AS count
            FROM attempts
            GROUP BY tense
            ORDER BY count DESC, tense ASC
            "#,
        )?;
        let tense_distribution = stmt
            .query_map([], |row| {
                Ok(TenseCount {
                    tense: row.get("tense")?,
                    count: row.get("count")?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(Statistics {
            total_attempts,
            correct_attempts,
            unique_verbs,
            unique_tenses,
            accuracy: srs::accuracy_percent(correct_attempts as u64, total_attempts as u64),
            best_verbs,
            tense_distribution,
        })
    }

    /// 最近的错误，新的在前
    pub fn get_recent_mistakes(&self, limit: usize) -> StorageResult<Vec<Mistake>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT verb, tense, person, user_answer, correct_answer, timestamp
            FROM attempts
            WHERE is_correct = 0
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let mistakes = stmt
            .query_map(params![sql_limit(limit)], |row| {
                Ok(Mistake {
                    verb: row.get("verb")?,
                    tense: row.get("tense")?,
                    person: row.get("person")?,
                    user_answer: row.get("user_answer")?,
                    correct_answer: row.get("correct_answer")?,
                    timestamp: parse_datetime(row.get::<_, String>("timestamp")?),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(mistakes)
    }

    /// 最近 `days` 天按日聚合的正确率
    pub fn get_learning_curve(&self, days: u32) -> StorageResult<Vec<CurvePoint>> {
        self.get_learning_curve_at(days, Utc::now())
    }

    pub fn get_learning_curve_at(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<CurvePoint>> {
        let since = now - Duration::days(i64::from(days));
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DATE(timestamp) AS date,
                   COUNT(*) AS attempts,
                   SUM(is_correct) AS correct,
                   CAST(SUM(is_correct) AS REAL) / COUNT(*) * 100 AS accuracy
            FROM attempts
            WHERE timestamp >= ?1
            GROUP BY DATE(timestamp)
            ORDER BY date ASC
            "#,
        )?;

        let points = stmt
            .query_map(params![format_datetime(since)], |row| {
                let date: String = row.get("date")?;
                Ok((
                    date,
                    row.get::<_, i64>("attempts")?,
                    row.get::<_, i64>("correct")?,
                    row.get::<_, f64>("accuracy")?,
                ))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(date, attempts, correct, accuracy)| {
                NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .ok()
                    .map(|date| CurvePoint {
                        date,
                        attempts,
                        correct,
                        accuracy,
                    })
            })
            .collect();

        Ok(points)
    }

    // ========== 会话 ==========

    /// 开始新会话，返回会话 id
    pub fn start_session(&self) -> StorageResult<i64> {
        let conn = self.get_connection()?;
        let id = Session::insert_started(&conn, Utc::now())?;
        tracing::info!(session_id = id, "session started");
        Ok(id)
    }

    /// 写入会话结束时间和汇总
    pub fn update_session(
        &self,
        session_id: i64,
        total: i64,
        correct: i64,
        verbs: &[String],
    ) -> StorageResult<()> {
        let conn = self.get_connection()?;
        let affected = conn.execute(
            r#"
            UPDATE sessions
            SET end_time = ?1,
                total_attempts = ?2,
                correct_attempts = ?3,
                verbs_practiced = ?4
            WHERE id = ?5
            "#,
            params![
                format_datetime(Utc::now()),
                total,
                correct,
                encode_verbs(verbs)?,
                session_id
            ],
        )?;

        if affected == 0 {
            return Err(StorageError::NotFound(format!("会话 {}", session_id)));
        }

        tracing::info!(session_id, total, correct, "session updated");
        Ok(())
    }

    /// 最近的会话，新的在前
    pub fn list_sessions(&self, limit: usize) -> StorageResult<Vec<Session>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions ORDER BY start_time DESC, id DESC LIMIT ?1",
        )?;

        let sessions = stmt
            .query_map(params![sql_limit(limit)], |row| Session::from_row(row))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(sessions)
    }
}

fn find_performance(
    conn: &Connection,
    verb: &str,
    tense: &str,
    person: i64,
) -> StorageResult<Option<VerbPerformance>> {
    let perf = conn
        .query_row(
            "SELECT * FROM verb_performance WHERE verb = ?1 AND tense = ?2 AND person = ?3",
            params![verb, tense, person],
            |row| VerbPerformance::from_row(row),
        )
        .optional()?;
    Ok(perf)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
