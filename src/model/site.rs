use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Pending,
    Building,
    Succeeded,
    Failed,
}

/// Configuration may only be fetched once the static generator has reported
/// a successful build, so the template's schema matches the repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteRecord {
    pub site_id: String,
    pub template: String,
    pub build_status: BuildStatus,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SiteRecord {
    pub fn config_ready(&self) -> bool {
        self.build_status == BuildStatus::Succeeded
    }
}
