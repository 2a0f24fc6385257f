//! # conjugar-algo - 西班牙语动词变位练习核心算法库
//!
//! 本 crate 提供纯 Rust 实现的练习算法:
//!
//! - **Conjugation** - 基于规则的动词变位引擎 (不规则表、词干变化、拼写变化)
//! - **Exercise Generation** - 模板填空练习、干扰项生成、连贯故事
//! - **Spaced Repetition** - 间隔加倍的复习调度与难度分数
//! - **Learning Paths / Speed / Scenarios** - 分级路径、限时练习、任务场景
//!
//! ## 设计理念
//!
//! - **纯 Rust** - 不依赖数据库或 IO，存储由 `conjugar` 应用负责
//! - **可复现** - 所有随机过程都可以通过种子固定
//!
//! ## 模块结构
//!
//! - [`conjugation`] - 变位引擎和动词词典
//! - [`sanitize`] - 答案归一化与判定
//! - [`exercise`] - 练习生成器
//! - [`srs`] - 复习间隔调度
//! - [`learning_path`] - 学习路径
//! - [`speed`] - 限时口语练习
//! - [`scenario`] - 任务场景
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use conjugar_algo::{Conjugator, ExerciseGenerator, Difficulty, Person, Tense};
//!
//! let conjugator = Conjugator::new();
//! assert_eq!(
//!     conjugator.conjugate("tener", Tense::Future, Person::Yo).as_deref(),
//!     Some("tendré")
//! );
//!
//! let mut generator = ExerciseGenerator::with_seed(42);
//! let exercise = generator
//!     .generate_exercise(None, None, None, Difficulty::Beginner)
//!     .unwrap();
//! assert!(exercise.choices.contains(&exercise.answer));
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod conjugation;
pub mod exercise;
pub mod learning_path;
pub mod sanitize;
pub mod scenario;
pub mod speed;
pub mod srs;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出变位引擎
pub use conjugation::{Conjugator, VerbClass};

/// 重新导出答案判定
pub use sanitize::{check_answer, AnswerCheck, Strictness, Verdict};

/// 重新导出练习生成器
pub use exercise::ExerciseGenerator;

/// 重新导出复习调度
pub use srs::ReviewUpdate;

pub use learning_path::LearningPath;
pub use scenario::TaskScenarios;
pub use speed::SpeedPractice;
