//! Learner state that lives in `app_settings` as JSON documents.

use conjugar_algo::{LearningPath, TaskScenarios};

use crate::storage::{Storage, StorageResult};

pub const LEARNING_PATH_KEY: &str = "learning_path";
pub const COMPLETED_SCENARIOS_KEY: &str = "completed_scenarios";

/// The saved learning path, or a fresh beginner path
pub fn load_learning_path(storage: &Storage) -> StorageResult<LearningPath> {
    Ok(storage
        .load_json::<LearningPath>(LEARNING_PATH_KEY)?
        .unwrap_or_default())
}

pub fn save_learning_path(storage: &Storage, path: &LearningPath) -> StorageResult<()> {
    storage.save_json(LEARNING_PATH_KEY, path)
}

/// Scenario runner seeded with the saved completion list
pub fn load_scenarios(storage: &Storage) -> StorageResult<TaskScenarios> {
    let completed: Vec<String> = storage
        .load_json(COMPLETED_SCENARIOS_KEY)?
        .unwrap_or_default();
    Ok(TaskScenarios::new().with_completed(completed))
}

pub fn save_scenarios(storage: &Storage, scenarios: &TaskScenarios) -> StorageResult<()> {
    storage.save_json(COMPLETED_SCENARIOS_KEY, &scenarios.progress().completed_list)
}
