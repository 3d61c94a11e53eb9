use serde::Serialize;

use super::pipeline::CandidateJob;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, ChatMessage};

const MATCHER_SYSTEM: &str = "You are a recruiting assistant. Given a candidate's resume \
    and a list of open jobs, select the single best matching job id. \
    Respond strictly as JSON: {\"best_job_id\": <id>, \"score\": <0-100>, \"reason\": \"<short reason>\"}.";

const MATCHER_INSTRUCTION: &str = "Pick the one job from `jobs` that best fits `resume_text`. \
    best_job_id must be one of the listed ids.";

#[derive(Serialize)]
struct MatcherInput<'a> {
    resume_text: &'a str,
    jobs: &'a [CandidateJob],
    instruction: &'a str,
}

/// System + user messages for a single matching call.
pub fn matcher_messages(
    resume_text: &str,
    candidates: &[CandidateJob],
) -> Result<Vec<ChatMessage>, serde_json::Error> {
    let input = MatcherInput {
        resume_text,
        jobs: candidates,
        instruction: MATCHER_INSTRUCTION,
    };
    Ok(vec![
        ChatMessage::system(format!("{MATCHER_SYSTEM} {JSON_ONLY_SYSTEM}")),
        ChatMessage::user(serde_json::to_string(&input)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_user_message_carries_only_job_text() {
        let candidates = vec![CandidateJob {
            id: 4,
            title: "Backend Engineer".into(),
            description: "APIs".into(),
            requirement: "Rust".into(),
            location: "Douala".into(),
        }];
        let messages = matcher_messages("ten years of Rust", &candidates).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("best_job_id"));

        let user: Value = serde_json::from_str(&messages[1].content).unwrap();
        assert_eq!(user["resume_text"], "ten years of Rust");
        assert_eq!(user["jobs"][0]["id"], 4);
        let job = user["jobs"][0].as_object().unwrap();
        assert!(!job.contains_key("salary"));
        assert!(!job.contains_key("employer"));
        assert!(user["instruction"].is_string());
    }
}
