//! Learning Paths
//!
//! Three fixed progressions (beginner, intermediate, advanced), each a list
//! of stages with a verb set, tense set and focus. A stage is passed at
//! [`PASS_THRESHOLD`] percent accuracy.
//!
//! [`LearningPath`] only holds the learner's position and per-stage scores,
//! so it serializes to a small JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, Tense};

/// Accuracy (percent) needed to pass a stage
pub const PASS_THRESHOLD: f64 = 70.0;

/// Exercises generated per stage session
pub const STAGE_EXERCISE_COUNT: usize = 10;

/// Share of beginner stages passed before intermediate is recommended
pub const INTERMEDIATE_RECOMMENDATION_RATIO: f64 = 0.8;

// ==================== Path definitions ====================

#[derive(Debug)]
pub struct Stage {
    pub name: &'static str,
    pub verbs: &'static [&'static str],
    pub tenses: &'static [Tense],
    pub focus: &'static str,
}

#[derive(Debug)]
pub struct PathDefinition {
    pub level: Difficulty,
    pub name: &'static str,
    pub description: &'static str,
    pub stages: &'static [Stage],
}

pub static PATHS: [PathDefinition; 3] = [
    PathDefinition {
        level: Difficulty::Beginner,
        name: "Beginner Path",
        description: "Start with present tense regular verbs",
        stages: &[
            Stage {
                name: "Present Regular -AR",
                verbs: &["hablar", "caminar", "estudiar"],
                tenses: &[Tense::Present],
                focus: "Master -ar endings",
            },
            Stage {
                name: "Present Regular -ER/-IR",
                verbs: &["comer", "vivir", "escribir"],
                tenses: &[Tense::Present],
                focus: "Learn -er and -ir patterns",
            },
            Stage {
                name: "Essential Irregulars",
                verbs: &["ser", "estar", "tener", "hacer"],
                tenses: &[Tense::Present],
                focus: "Most common irregular verbs",
            },
            Stage {
                name: "Past Tense Introduction",
                verbs: &["hablar", "comer", "vivir"],
                tenses: &[Tense::Preterite],
                focus: "Simple past actions",
            },
        ],
    },
    PathDefinition {
        level: Difficulty::Intermediate,
        name: "Intermediate Path",
        description: "Expand tenses and irregular patterns",
        stages: &[
            Stage {
                name: "Preterite Mastery",
                verbs: &["ir", "ser", "hacer", "tener", "estar"],
                tenses: &[Tense::Preterite],
                focus: "Irregular preterite forms",
            },
            Stage {
                name: "Imperfect vs Preterite",
                verbs: &["hablar", "ser", "estar", "tener"],
                tenses: &[Tense::Preterite, Tense::Imperfect],
                focus: "Understand aspect differences",
            },
            Stage {
                name: "Future & Conditional",
                verbs: &["hablar", "tener", "poder", "saber"],
                tenses: &[Tense::Future, Tense::Conditional],
                focus: "Express future and hypothetical",
            },
            Stage {
                name: "Stem-Changing Verbs",
                verbs: &["pensar", "dormir", "pedir", "jugar"],
                tenses: &[Tense::Present, Tense::Preterite],
                focus: "e→ie, o→ue, e→i patterns",
            },
        ],
    },
    PathDefinition {
        level: Difficulty::Advanced,
        name: "Advanced Path",
        description: "Subjunctive and complex structures",
        stages: &[
            Stage {
                name: "Present Subjunctive",
                verbs: &["hablar", "ser", "tener", "hacer"],
                tenses: &[Tense::PresentSubjunctive],
                focus: "Wishes, doubts, emotions",
            },
            Stage {
                name: "All Tenses Integration",
                verbs: &["ser", "estar", "tener", "hacer", "poder"],
                tenses: &Tense::ALL,
                focus: "Fluent tense switching",
            },
        ],
    },
];

pub fn path_definition(level: Difficulty) -> &'static PathDefinition {
    match level {
        Difficulty::Beginner => &PATHS[0],
        Difficulty::Intermediate => &PATHS[1],
        Difficulty::Advanced => &PATHS[2],
    }
}

fn total_stage_count() -> usize {
    PATHS.iter().map(|p| p.stages.len()).sum()
}

// ==================== Results ====================

/// Parameters for a stage practice session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageExercises {
    pub verbs: Vec<String>,
    pub tenses: Vec<Tense>,
    pub count: usize,
    pub focus_message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub passed: bool,
    pub path_complete: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub current_path: String,
    /// 1-based
    pub current_stage: usize,
    pub total_stages_in_path: usize,
    /// Percent of all stages (every path) passed
    pub overall_completion: f64,
    pub completed_stages: usize,
    pub total_stages: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stages: usize,
}

// ==================== Learner state ====================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub current_path: Difficulty,
    pub current_stage: usize,
    /// Best accuracy per stage, keyed `"{path}_{stage}"`
    #[serde(default)]
    pub stage_progress: BTreeMap<String, f64>,
}

impl Default for LearningPath {
    fn default() -> Self {
        Self {
            current_path: Difficulty::Beginner,
            current_stage: 0,
            stage_progress: BTreeMap::new(),
        }
    }
}

fn stage_key(path: Difficulty, stage: usize) -> String {
    format!("{}_{}", path.as_str(), stage)
}

impl LearningPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(&self) -> &'static PathDefinition {
        path_definition(self.current_path)
    }

    /// `None` once the path is finished
    pub fn current_stage(&self) -> Option<&'static Stage> {
        self.definition().stages.get(self.current_stage)
    }

    pub fn stage_exercises(&self) -> Option<StageExercises> {
        self.current_stage().map(|stage| StageExercises {
            verbs: stage.verbs.iter().map(|v| v.to_string()).collect(),
            tenses: stage.tenses.to_vec(),
            count: STAGE_EXERCISE_COUNT,
            focus_message: stage.focus.to_string(),
        })
    }

    /// Record a stage result and advance when it passes
    pub fn complete_stage(&mut self, accuracy: f64) -> StageOutcome {
        let path = self.definition();
        if self.current_stage >= path.stages.len() {
            return StageOutcome {
                passed: false,
                path_complete: true,
                message: format!("The {} is already complete", path.name),
            };
        }

        let accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let best = self
            .stage_progress
            .entry(stage_key(self.current_path, self.current_stage))
            .or_insert(accuracy);
        *best = best.max(accuracy);

        if accuracy < PASS_THRESHOLD {
            return StageOutcome {
                passed: false,
                path_complete: false,
                message: format!(
                    "Keep practicing! Aim for {:.0}% accuracy (current: {:.0}%)",
                    PASS_THRESHOLD, accuracy
                ),
            };
        }

        self.current_stage += 1;
        match path.stages.get(self.current_stage) {
            Some(next) => StageOutcome {
                passed: true,
                path_complete: false,
                message: format!("Moving to: {}", next.name),
            },
            None => StageOutcome {
                passed: true,
                path_complete: true,
                message: format!("Congratulations! You've completed the {}", path.name),
            },
        }
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        let total_stages = total_stage_count();
        let completed_stages = self
            .stage_progress
            .values()
            .filter(|&&a| a >= PASS_THRESHOLD)
            .count();
        let path = self.definition();

        ProgressSummary {
            current_path: path.name.to_string(),
            current_stage: (self.current_stage + 1).min(path.stages.len()),
            total_stages_in_path: path.stages.len(),
            overall_completion: if total_stages > 0 {
                completed_stages as f64 / total_stages as f64 * 100.0
            } else {
                0.0
            },
            completed_stages,
            total_stages,
        }
    }

    /// Switch to a path by id; resets the stage position
    pub fn switch_path(&mut self, path: &str) -> bool {
        match Difficulty::from_str(path) {
            Some(level) => {
                self.current_path = level;
                self.current_stage = 0;
                true
            }
            None => false,
        }
    }

    pub fn available_paths(&self) -> Vec<PathInfo> {
        PATHS
            .iter()
            .map(|p| PathInfo {
                id: p.level.as_str().to_string(),
                name: p.name.to_string(),
                description: p.description.to_string(),
                stages: p.stages.len(),
            })
            .collect()
    }

    /// An explicit known level wins; otherwise intermediate once enough
    /// beginner stages are passed
    pub fn recommend_path(&self, level: Option<&str>) -> Difficulty {
        if let Some(level) = level.and_then(Difficulty::from_str) {
            return level;
        }

        let beginner = path_definition(Difficulty::Beginner);
        let passed = (0..beginner.stages.len())
            .filter(|&i| {
                self.stage_progress
                    .get(&stage_key(Difficulty::Beginner, i))
                    .is_some_and(|&a| a >= PASS_THRESHOLD)
            })
            .count();

        if passed > 0
            && passed as f64 >= beginner.stages.len() as f64 * INTERMEDIATE_RECOMMENDATION_RATIO
        {
            Difficulty::Intermediate
        } else {
            Difficulty::Beginner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_learner_starts_at_beginning() {
        let path = LearningPath::new();
        assert_eq!(path.current_path, Difficulty::Beginner);
        assert_eq!(path.current_stage().unwrap().name, "Present Regular -AR");

        let params = path.stage_exercises().unwrap();
        assert_eq!(params.count, STAGE_EXERCISE_COUNT);
        assert_eq!(params.verbs, vec!["hablar", "caminar", "estudiar"]);
        assert_eq!(params.tenses, vec![Tense::Present]);
    }

    #[test]
    fn test_failing_stage_does_not_advance() {
        let mut path = LearningPath::new();
        let outcome = path.complete_stage(60.0);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("60%"));
        assert_eq!(path.current_stage, 0);
        assert_eq!(path.stage_progress["beginner_0"], 60.0);
    }

    #[test]
    fn test_passing_at_threshold_advances() {
        let mut path = LearningPath::new();
        let outcome = path.complete_stage(70.0);
        assert!(outcome.passed);
        assert_eq!(outcome.message, "Moving to: Present Regular -ER/-IR");
        assert_eq!(path.current_stage, 1);
    }

    #[test]
    fn test_path_completion_and_guard() {
        let mut path = LearningPath::new();
        path.switch_path("advanced");
        path.complete_stage(90.0);
        let outcome = path.complete_stage(85.0);
        assert!(outcome.path_complete);
        assert!(path.current_stage().is_none());
        assert!(path.stage_exercises().is_none());

        let again = path.complete_stage(100.0);
        assert!(!again.passed);
        assert!(again.path_complete);
        assert_eq!(path.progress_summary().current_stage, 2);
    }

    #[test]
    fn test_best_score_is_kept() {
        let mut path = LearningPath::new();
        path.complete_stage(50.0);
        path.complete_stage(40.0);
        assert_eq!(path.stage_progress["beginner_0"], 50.0);
    }

    #[test]
    fn test_progress_summary() {
        let mut path = LearningPath::new();
        path.complete_stage(80.0);
        path.complete_stage(30.0);
        let summary = path.progress_summary();
        assert_eq!(summary.completed_stages, 1);
        assert_eq!(summary.total_stages, 10);
        assert_eq!(summary.current_stage, 2);
        assert_eq!(summary.total_stages_in_path, 4);
        assert!((summary.overall_completion - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_switch_path() {
        let mut path = LearningPath::new();
        path.complete_stage(100.0);
        assert!(path.switch_path("Intermediate"));
        assert_eq!(path.current_stage, 0);
        assert!(!path.switch_path("expert"));
        assert_eq!(path.current_path, Difficulty::Intermediate);
    }

    #[test]
    fn test_recommend_path() {
        let mut path = LearningPath::new();
        assert_eq!(path.recommend_path(None), Difficulty::Beginner);
        assert_eq!(path.recommend_path(Some("ADVANCED")), Difficulty::Advanced);
        assert_eq!(path.recommend_path(Some("expert")), Difficulty::Beginner);

        for _ in 0..3 {
            path.complete_stage(75.0);
        }
        // 3 of 4 is below 80%
        assert_eq!(path.recommend_path(None), Difficulty::Beginner);
        path.complete_stage(75.0);
        assert_eq!(path.recommend_path(None), Difficulty::Intermediate);
    }

    #[test]
    fn test_state_json_roundtrip() {
        let mut path = LearningPath::new();
        path.complete_stage(88.0);
        let json = serde_json::to_string(&path).unwrap();
        let restored: LearningPath = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, path);
    }

    #[test]
    fn test_available_paths() {
        let ids: Vec<String> = LearningPath::new()
            .available_paths()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["beginner", "intermediate", "advanced"]);
    }
}
