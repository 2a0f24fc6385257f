//! 数据库行模型
//!
//! 时间统一以 UTC `%Y-%m-%d %H:%M:%S` 文本存储，便于 SQLite 的
//! `DATE()` / `datetime()` 直接比较。

use chrono::{DateTime, NaiveDateTime, Utc};
use conjugar_algo::{Person, ReviewUpdate, Tense};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};

use crate::storage::{StorageError, StorageResult};

// ============================================================
// Attempt - 作答记录
// ============================================================

/// 一次作答，只追加不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub verb: String,
    pub tense: String,
    pub person: i64,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        verb: &str,
        tense: Tense,
        person: Person,
        user_answer: &str,
        correct_answer: &str,
        is_correct: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            verb: verb.to_string(),
            tense: tense.as_str().to_string(),
            person: person.index() as i64,
            user_answer: user_answer.to_string(),
            correct_answer: correct_answer.to_string(),
            is_correct,
            timestamp,
        }
    }

    pub fn from_row(row: &Row) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            verb: row.get("verb")?,
            tense: row.get("tense")?,
            person: row.get("person")?,
            user_answer: row.get("user_answer")?,
            correct_answer: row.get("correct_answer")?,
            is_correct: row.get::<_, i32>("is_correct")? != 0,
            timestamp: parse_datetime(row.get::<_, String>("timestamp")?),
        })
    }

    /// 插入并返回新行 id
    pub fn insert(&self, conn: &Connection) -> StorageResult<i64> {
        conn.execute(
            r#"
            INSERT INTO attempts (
                verb, tense, person, user_answer, correct_answer, is_correct, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                self.verb,
                self.tense,
                self.person,
                self.user_answer,
                self.correct_answer,
                self.is_correct as i32,
                format_datetime(self.timestamp),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

// ============================================================
// VerbPerformance - 复习状态
// ============================================================

/// `(verb, tense, person)` 的累计表现和下一次复习时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbPerformance {
    pub verb: String,
    pub tense: String,
    pub person: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub last_seen: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub difficulty_score: f64,
    pub interval_days: i64,
}

impl VerbPerformance {
    pub fn from_row(row: &Row) -> SqliteResult<Self> {
        Ok(Self {
            verb: row.get("verb")?,
            tense: row.get("tense")?,
            person: row.get("person")?,
            correct_count: row.get("correct_count")?,
            incorrect_count: row.get("incorrect_count")?,
            last_seen: row
                .get::<_, Option<String>>("last_seen")?
                .map(parse_datetime),
            next_review: row
                .get::<_, Option<String>>("next_review")?
                .map(parse_datetime),
            difficulty_score: row.get("difficulty_score")?,
            interval_days: row.get("interval_days")?,
        })
    }

    /// 按主键插入或覆盖
    pub fn upsert(&self, conn: &Connection) -> StorageResult<()> {
        conn.execute(
            r#"
            INSERT INTO verb_performance (
                verb, tense, person, correct_count, incorrect_count,
                last_seen, next_review, difficulty_score, interval_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(verb, tense, person) DO UPDATE SET
                correct_count = excluded.correct_count,
                incorrect_count = excluded.incorrect_count,
                last_seen = excluded.last_seen,
                next_review = excluded.next_review,
                difficulty_score = excluded.difficulty_score,
                interval_days = excluded.interval_days
            "#,
            params![
                self.verb,
                self.tense,
                self.person,
                self.correct_count,
                self.incorrect_count,
                self.last_seen.map(format_datetime),
                self.next_review.map(format_datetime),
                self.difficulty_score,
                self.interval_days,
            ],
        )?;
        Ok(())
    }

    pub fn total_attempts(&self) -> i64 {
        self.correct_count + self.incorrect_count
    }

    /// 正确率 (0-1)
    pub fn accuracy(&self) -> f64 {
        match self.total_attempts() {
            0 => 0.0,
            total => self.correct_count as f64 / total as f64,
        }
    }

    /// 调度器需要的上一次状态
    pub fn review_state(&self) -> ReviewUpdate {
        ReviewUpdate {
            interval_days: u32::try_from(self.interval_days.max(0)).unwrap_or(u32::MAX),
            difficulty_score: self.difficulty_score,
        }
    }

    pub fn tense(&self) -> Option<Tense> {
        Tense::from_str(&self.tense)
    }

    pub fn person(&self) -> Option<Person> {
        usize::try_from(self.person).ok().and_then(Person::from_index)
    }
}

// ============================================================
// Session - 练习会话
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_attempts: i64,
    pub correct_attempts: i64,
    pub verbs_practiced: Vec<String>,
}

impl Session {
    pub fn from_row(row: &Row) -> SqliteResult<Self> {
        let verbs: String = row.get("verbs_practiced")?;
        Ok(Self {
            id: row.get("id")?,
            start_time: parse_datetime(row.get::<_, String>("start_time")?),
            end_time: row
                .get::<_, Option<String>>("end_time")?
                .map(parse_datetime),
            total_attempts: row.get("total_attempts")?,
            correct_attempts: row.get("correct_attempts")?,
            verbs_practiced: serde_json::from_str(&verbs).unwrap_or_default(),
        })
    }

    /// 新会话行，返回 id
    pub fn insert_started(conn: &Connection, start_time: DateTime<Utc>) -> StorageResult<i64> {
        conn.execute(
            "INSERT INTO sessions (start_time, total_attempts, correct_attempts, verbs_practiced)
             VALUES (?1, 0, 0, '[]')",
            params![format_datetime(start_time)],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// 序列化会话动词列表
pub(crate) fn encode_verbs(verbs: &[String]) -> StorageResult<String> {
    serde_json::to_string(verbs).map_err(|e| StorageError::Serialization(e.to_string()))
}

// ============================================================
// 工具函数
// ============================================================

/// 解析数据库中的时间，格式不识别时回退为当前时间
pub(crate) fn parse_datetime(s: String) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S") {
        return DateTime::from_naive_utc_and_offset(dt, Utc);
    }

    Utc::now()
}

pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_round_trip_is_second_precise() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 2).unwrap();
        assert_eq!(format_datetime(dt), "2024-03-09 17:45:02");
        assert_eq!(parse_datetime(format_datetime(dt)), dt);
    }

    #[test]
    fn test_parse_datetime_accepts_rfc3339() {
        let parsed = parse_datetime("2024-03-09T17:45:02+02:00".to_string());
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 9, 15, 45, 2).unwrap());
    }

    #[test]
    fn test_performance_accuracy_and_typed_fields() {
        let perf = VerbPerformance {
            verb: "hablar".into(),
            tense: "present_subjunctive".into(),
            person: 3,
            correct_count: 3,
            incorrect_count: 1,
            last_seen: None,
            next_review: None,
            difficulty_score: 0.35,
            interval_days: 4,
        };
        assert_eq!(perf.total_attempts(), 4);
        assert!((perf.accuracy() - 0.75).abs() < 1e-9);
        assert_eq!(perf.tense(), Some(Tense::PresentSubjunctive));
        assert_eq!(perf.person(), Some(Person::Nosotros));
        assert_eq!(perf.review_state().interval_days, 4);
    }
}
