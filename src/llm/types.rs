use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BenchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }
    pub fn user(content: &str) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }
    pub fn assistant(content: &str) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }
}

/// A prompt exactly as the caller sent it: either a flat string or a list of turns.
/// Serializes back to the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Turns(Vec<Turn>),
}

impl Prompt {
    /// Parse the `messages` field of a request body.
    pub fn from_value(value: Value) -> Result<Self, BenchError> {
        serde_json::from_value(value).map_err(|e| {
            BenchError::Validation(format!(
                "Prompt must be a string or a list of {{role, content}} turns: {}",
                e
            ))
        })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Turns(turns) => turns.is_empty(),
        }
    }

    /// Turn view of the prompt; a flat string becomes a single user turn.
    pub fn turns(&self) -> Vec<Turn> {
        match self {
            Self::Text(text) => vec![Turn::user(text)],
            Self::Turns(turns) => turns.clone(),
        }
    }

    /// Single text block of `"{role}: {content}"` lines, for completion-style APIs.
    pub fn flatten(&self) -> String {
        self.turns()
            .iter()
            .map(|t| format!("{}: {}", t.role, t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<Turn>> for Prompt {
    fn from(turns: Vec<Turn>) -> Self {
        Self::Turns(turns)
    }
}

/// Normalized result of one completion call. This is what gets recorded and returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub model: String,
    pub prompt: Prompt,
    pub response: String,
    pub time_elapsed: f64,
}

impl ResponseRecord {
    pub fn new(model: &str, prompt: &Prompt, response: String, elapsed: Duration) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.clone(),
            response,
            time_elapsed: elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_parses_flat_string() {
        let prompt = Prompt::from_value(json!("hello")).unwrap();
        assert_eq!(prompt, Prompt::Text("hello".into()));
        assert_eq!(prompt.turns(), vec![Turn::user("hello")]);
    }

    #[test]
    fn test_prompt_parses_turns() {
        let prompt = Prompt::from_value(json!([
            {"role": "system", "content": "be terse"},
            {"role": "user", "content": "hi"}
        ])).unwrap();
        assert_eq!(prompt.turns(), vec![Turn::system("be terse"), Turn::user("hi")]);
    }

    #[test]
    fn test_prompt_rejects_unknown_role() {
        let err = Prompt::from_value(json!([{"role": "tool", "content": "x"}])).unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
    }

    #[test]
    fn test_prompt_keeps_shape_when_serialized() {
        let text = Prompt::Text("plain".into());
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("plain"));

        let turns = Prompt::Turns(vec![Turn::user("hi")]);
        assert_eq!(serde_json::to_value(&turns).unwrap(), json!([{"role": "user", "content": "hi"}]));
    }

    #[test]
    fn test_prompt_is_empty() {
        assert!(Prompt::Text(String::new()).is_empty());
        assert!(!Prompt::Text("  ".into()).is_empty());
        assert!(Prompt::Turns(vec![]).is_empty());
        assert!(!Prompt::Text("x".into()).is_empty());
    }

    #[test]
    fn test_flatten_joins_role_prefixed_lines() {
        let prompt = Prompt::Turns(vec![
            Turn::system("be terse"),
            Turn::user("hi"),
            Turn::assistant("hello"),
        ]);
        assert_eq!(prompt.flatten(), "system: be terse\nuser: hi\nassistant: hello");
        assert_eq!(Prompt::Text("hi".into()).flatten(), "user: hi");
    }

    #[test]
    fn test_record_elapsed_in_seconds() {
        let record = ResponseRecord::new(
            "gpt-4o",
            &Prompt::Text("hi".into()),
            "hello".into(),
            Duration::from_millis(1500),
        );
        assert!((record.time_elapsed - 1.5).abs() < f64::EPSILON);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["prompt"], "hi");
        assert_eq!(value["response"], "hello");
    }
}
