use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// Score and advice recovered from the model reply, or a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub score: Option<u8>,
    pub feedback: String,
}

impl AiAnalysis {
    pub fn fallback(feedback: impl Into<String>) -> Self {
        Self {
            score: None,
            feedback: feedback.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub text: String,
    pub skills: Vec<String>,
    pub ai_analysis: AiAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchReport {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
    pub match_score: Option<u8>,
}

/// Result of comparing a resume with a job description. Replies that are not
/// usable JSON are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobMatch {
    Report(JobMatchReport),
    Raw { raw: String },
}
