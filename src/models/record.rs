use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One processed upload, as persisted in the `resumes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub filename: String,
    pub text: String,
    pub skills: Vec<String>,
    #[serde(
        rename = "uploadedAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeRecord {
    pub fn new(filename: String, text: String, skills: Vec<String>) -> Self {
        Self {
            filename,
            text,
            skills,
            uploaded_at: Utc::now(),
        }
    }
}
