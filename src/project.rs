use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub uuid: String,
    #[serde(default = "default_calculate_histogram_metrics")]
    pub calculate_histogram_metrics: bool,
}
fn default_calculate_histogram_metrics() -> bool {
    true
}
impl ProjectConfig {
    pub fn new(uuid: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            calculate_histogram_metrics: true,
        }
    }

    pub fn set_calculate_histogram_metrics(mut self, enabled: bool) -> Self {
        self.calculate_histogram_metrics = enabled;
        self
    }
}

/// Yields the project the pipeline should talk about, if any.
pub trait ProjectContext: Send + Sync {
    fn active_project(&self) -> Option<ProjectConfig>;
}

#[derive(Debug, Default)]
pub struct ActiveProject(RwLock<Option<ProjectConfig>>);
impl ActiveProject {
    pub fn new(project: Option<ProjectConfig>) -> Self {
        Self(RwLock::new(project))
    }

    pub fn select(&self, project: ProjectConfig) {
        *self.0.write() = Some(project);
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }
}
impl ProjectContext for ActiveProject {
    fn active_project(&self) -> Option<ProjectConfig> {
        self.0.read().clone()
    }
}
