//! Lenient decoding of the model's reply.
//!
//! Models wrap JSON in prose or code fences and occasionally quote numbers.
//! Anything that cannot be read as an object collapses to `Unparsable`; a
//! field of the wrong shape collapses to `None` without failing the rest.

use serde_json::{Map, Number, Value};

/// What the model claimed, field by field. `score` keeps the model's number
/// as written, so `91` stays an integer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPick {
    pub best_job_id: Option<i64>,
    pub score: Option<Number>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Parsed(ModelPick),
    Unparsable,
}

impl ModelReply {
    /// The pick, or an empty one when nothing could be read.
    pub fn into_pick(self) -> ModelPick {
        match self {
            ModelReply::Parsed(pick) => pick,
            ModelReply::Unparsable => ModelPick::default(),
        }
    }
}

/// Tries the whole reply as a JSON object first, then the span from the first
/// `{` to the last `}`.
pub fn parse_model_reply(raw: &str) -> ModelReply {
    if let Some(object) = as_object(raw) {
        return ModelReply::Parsed(pick_from(&object));
    }

    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => return ModelReply::Unparsable,
    };

    match as_object(span) {
        Some(object) => ModelReply::Parsed(pick_from(&object)),
        None => ModelReply::Unparsable,
    }
}

fn as_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn pick_from(object: &Map<String, Value>) -> ModelPick {
    ModelPick {
        best_job_id: object.get("best_job_id").and_then(job_id_of),
        score: object.get("score").and_then(score_of),
        reason: object
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn job_id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn score_of(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_reply() {
        let reply = parse_model_reply(r#"{"best_job_id": 3, "score": 78.5, "reason": "python"}"#);
        assert_eq!(
            reply,
            ModelReply::Parsed(ModelPick {
                best_job_id: Some(3),
                score: Number::from_f64(78.5),
                reason: Some("python".into()),
            })
        );
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let reply = parse_model_reply(
            "Sure! {\"best_job_id\": 2, \"score\": 91, \"reason\": \"skills match\"}",
        )
        .into_pick();
        assert_eq!(reply.best_job_id, Some(2));
        assert_eq!(reply.score, Some(Number::from(91)));
        assert_eq!(reply.reason.as_deref(), Some("skills match"));
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"best_job_id\": 7, \"score\": 60, \"reason\": \"ok\"}\n```";
        assert_eq!(parse_model_reply(raw).into_pick().best_job_id, Some(7));
    }

    #[test]
    fn test_refusal_is_unparsable() {
        assert_eq!(
            parse_model_reply("I cannot help with that."),
            ModelReply::Unparsable
        );
        assert_eq!(parse_model_reply(""), ModelReply::Unparsable);
        assert_eq!(parse_model_reply("} backwards {"), ModelReply::Unparsable);
    }

    #[test]
    fn test_non_object_json_is_unparsable() {
        assert_eq!(parse_model_reply("[1, 2, 3]"), ModelReply::Unparsable);
        assert_eq!(parse_model_reply("42"), ModelReply::Unparsable);
    }

    #[test]
    fn test_quoted_numbers_are_accepted() {
        let pick = parse_model_reply(r#"{"best_job_id": "12", "score": "88", "reason": "fit"}"#)
            .into_pick();
        assert_eq!(pick.best_job_id, Some(12));
        assert_eq!(pick.score, Some(Number::from(88)));
    }

    #[test]
    fn test_wrong_shaped_fields_become_none() {
        let pick = parse_model_reply(r#"{"best_job_id": "abc", "score": null, "reason": 5}"#)
            .into_pick();
        assert_eq!(pick, ModelPick::default());
    }
}
