/// Prompt for the upload flow: a 0-100 score plus short advice, judged
/// against the skill vocabulary.
pub fn resume_score_prompt(resume_text: &str, vocabulary: &[&str]) -> String {
    let keywords = vocabulary
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert career coach.

Analyze the resume text below based on the following skill keywords:
[{keywords}]

Return ONLY a valid JSON object with two fields:
{{
  "score": number (0-100),
  "feedback": string (1-3 sentence advice to improve resume)
}}

Do not include any explanations or extra text.

Resume text:
{resume_text}
"#
    )
}

pub fn job_match_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        r#"You are a helpful assistant that analyzes a candidate's resume text against a job description.
Extract the main skills mentioned, suggest any missing skills relevant to the job, and provide an overall match score (0-100).

Job Description:
{job_description}

Candidate Resume Text:
{resume_text}

Please respond in JSON with fields:
{{
  "matchedSkills": [ ... ],
  "missingSkills": [ ... ],
  "summary": "...",
  "matchScore": 0-100
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_prompt_embeds_text_and_vocabulary() {
        let prompt = resume_score_prompt("Ten years of Rust", &["react", "ci/cd"]);
        assert!(prompt.contains("[\"react\", \"ci/cd\"]"));
        assert!(prompt.ends_with("Resume text:\nTen years of Rust\n"));
        assert!(prompt.contains("\"score\": number (0-100)"));
    }

    #[test]
    fn test_job_match_prompt_embeds_both_inputs() {
        let prompt = job_match_prompt("resume body", "job body");
        assert!(prompt.contains("Job Description:\njob body"));
        assert!(prompt.contains("Candidate Resume Text:\nresume body"));
        assert!(prompt.contains("\"matchScore\""));
    }
}
