use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub id: u64,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub name: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub job_name: String,
    /// Empty for one-off builds
    #[serde(default)]
    pub pipeline_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_url: String,
    /// Unix seconds, 0 if the build has not started yet
    #[serde(default)]
    pub start_time: i64,
    /// Unix seconds, 0 if the build has not finished yet
    #[serde(default)]
    pub end_time: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    Pending,
    Started,
    Succeeded,
    Failed,
    Errored,
    Aborted,
    Paused,
    Other(String),
}

impl BuildStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Started => "started",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Aborted => "aborted",
            BuildStatus::Paused => "paused",
            BuildStatus::Other(status) => status,
        }
    }
}

impl From<String> for BuildStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => BuildStatus::Pending,
            "started" => BuildStatus::Started,
            "succeeded" => BuildStatus::Succeeded,
            "failed" => BuildStatus::Failed,
            "errored" => BuildStatus::Errored,
            "aborted" => BuildStatus::Aborted,
            "paused" => BuildStatus::Paused,
            _ => BuildStatus::Other(value),
        }
    }
}

impl From<BuildStatus> for String {
    fn from(value: BuildStatus) -> Self {
        match value {
            BuildStatus::Other(status) => status,
            status => status.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Page of a paginated listing. Zero fields are unset and are not sent.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub since: u64,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub until: u64,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub limit: u64,
}

fn is_unset(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub previous: Option<Page>,
    pub next: Option<Page>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: String,
    pub value: String,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
