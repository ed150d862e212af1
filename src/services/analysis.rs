use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::{AiAnalysis, JobMatch};
use crate::services::ai_client::{CompletionClient, CompletionError, CompletionRequest};
use crate::services::{prompts, reply_parser, skills::SKILL_VOCABULARY};

pub const UNAVAILABLE_FEEDBACK: &str = "AI analysis is currently unavailable. Please try again later.";

const SCORE_TEMPERATURE: f64 = 0.3;
const SCORE_MAX_TOKENS: u32 = 400;
const JOB_MATCH_TEMPERATURE: f64 = 0.3;
const JOB_MATCH_MAX_TOKENS: u32 = 400;

/// Sends resume text to the completion API and interprets the reply.
#[derive(Clone)]
pub struct Analyzer {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Scores a resume. Never fails: transport errors and unparseable
    /// replies both produce a fallback with no score.
    pub async fn score_resume(&self, resume_text: &str) -> AiAnalysis {
        let request = CompletionRequest {
            prompt: prompts::resume_score_prompt(resume_text, SKILL_VOCABULARY),
            temperature: SCORE_TEMPERATURE,
            max_tokens: SCORE_MAX_TOKENS,
        };

        match self.complete(&request).await {
            Ok(reply) => {
                debug!(reply_length = reply.len(), "Received resume score reply");
                let analysis = reply_parser::parse_analysis(&reply);
                if analysis.score.is_none() {
                    warn!("Model reply carried no usable score");
                }
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Resume analysis unavailable, returning fallback");
                AiAnalysis::fallback(UNAVAILABLE_FEEDBACK)
            }
        }
    }

    pub async fn match_job(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<JobMatch, CompletionError> {
        let request = CompletionRequest {
            prompt: prompts::job_match_prompt(resume_text, job_description),
            temperature: JOB_MATCH_TEMPERATURE,
            max_tokens: JOB_MATCH_MAX_TOKENS,
        };

        let reply = self.complete(&request).await?;
        let result = reply_parser::parse_job_match(&reply);
        if let JobMatch::Raw { .. } = result {
            info!("Job match reply was not JSON, passing it through raw");
        }
        Ok(result)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| CompletionError::Timeout(self.timeout))?
    }
}
