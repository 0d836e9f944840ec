//! Tool-calling loop over the `ChatModel` seam.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{
    strip_json_fences, ChatModel, ContentBlock, LlmError, Message, Role, ToolDefinition,
};

/// Model round trips that may request tools before the turn is cut off.
pub const MAX_TOOL_ROUNDS: usize = 5;

pub const DEFAULT_ANSWER: &str =
    "I'm here to help! What would you like to know about Syscraft's services or career opportunities?";
const TOOL_LIMIT_ANSWER: &str =
    "I couldn't finish that request in one go. Could you rephrase it or break it into smaller questions?";

/// Result of one tool invocation, fed back to the model as a `tool_result` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;
    async fn execute(&self, name: &str, input: &Value) -> ToolOutcome;
}

/// Appends `user_message` to `history`, then lets the model answer, executing
/// requested tools for up to `MAX_TOOL_ROUNDS` rounds. Every model turn and
/// tool result is appended to `history`. Returns the final answer text.
pub async fn run_agent(
    model: &dyn ChatModel,
    tools: &dyn ToolExecutor,
    system: &str,
    history: &mut Vec<Message>,
    user_message: String,
) -> Result<String, LlmError> {
    history.push(Message::user_text(user_message));
    let definitions = tools.definitions();

    for round in 0..MAX_TOOL_ROUNDS {
        let response = model.complete(system, history.as_slice(), &definitions).await?;
        let content = response.replayable_content();

        if !response.wants_tools() {
            // Empty text blocks are rejected on replay.
            let answer = match response.text() {
                text if text.trim().is_empty() => DEFAULT_ANSWER.to_string(),
                text => text,
            };
            history.push(Message::assistant_text(answer.clone()));
            return Ok(answer);
        }

        let mut results = Vec::new();
        for block in &content {
            if let ContentBlock::ToolUse { id, name, input } = block {
                debug!("Round {round}: executing tool {name}");
                let outcome = tools.execute(name, input).await;
                if outcome.is_error {
                    warn!("Tool {name} failed: {}", outcome.content);
                }
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content: outcome.content,
                    is_error: outcome.is_error,
                });
            }
        }

        history.push(Message {
            role: Role::Assistant,
            content,
        });
        history.push(Message {
            role: Role::User,
            content: results,
        });
    }

    warn!("Tool round limit ({MAX_TOOL_ROUNDS}) reached without a final answer");
    history.push(Message::assistant_text(TOOL_LIMIT_ANSWER));
    Ok(TOOL_LIMIT_ANSWER.to_string())
}

/// Unwraps `{"answer": ...}` when the model replied with JSON, falling back
/// to the raw text and then to a friendly default when empty.
pub fn normalize_answer(raw: &str) -> String {
    let text = strip_json_fences(raw);
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                if let Some(answer) = value.get("answer").and_then(Value::as_str) {
                    if !answer.trim().is_empty() {
                        return answer.trim().to_string();
                    }
                }
            }
        }
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_ANSWER.to_string()
    } else {
        trimmed.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct EchoTools {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolExecutor for EchoTools {
        fn definitions(&self) -> Vec<ToolDefinition> {
            Vec::new()
        }

        async fn execute(&self, name: &str, input: &Value) -> ToolOutcome {
            self.seen.lock().await.push(name.to_string());
            if name == "broken" {
                ToolOutcome::error("boom")
            } else {
                ToolOutcome::ok(format!("{name}:{input}"))
            }
        }
    }

    #[tokio::test]
    async fn test_plain_answer_needs_one_call() {
        let model = ScriptedModel::new(vec![Ok(text_response("Hello!"))]);
        let tools = EchoTools::default();
        let mut history = Vec::new();
        let answer = run_agent(&model, &tools, "sys", &mut history, "hi".into())
            .await
            .unwrap();
        assert_eq!(answer, "Hello!");
        assert_eq!(history.len(), 2);
        assert!(tools.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let model = ScriptedModel::new(vec![
            Ok(tool_response("tu_1", "get_job_openings", json!({}))),
            Ok(text_response("We have 4 openings.")),
        ]);
        let tools = EchoTools::default();
        let mut history = Vec::new();
        let answer = run_agent(&model, &tools, "sys", &mut history, "jobs?".into())
            .await
            .unwrap();

        assert_eq!(answer, "We have 4 openings.");
        assert_eq!(*tools.seen.lock().await, vec!["get_job_openings"]);
        // user, assistant(tool_use), user(tool_result), assistant(text)
        assert_eq!(history.len(), 4);
        assert!(matches!(
            &history[2].content[0],
            ContentBlock::ToolResult { tool_use_id, is_error: false, .. } if tool_use_id == "tu_1"
        ));
    }

    #[tokio::test]
    async fn test_failed_tool_is_flagged_not_fatal() {
        let model = ScriptedModel::new(vec![
            Ok(tool_response("tu_1", "broken", json!({}))),
            Ok(text_response("Sorry, that failed.")),
        ]);
        let tools = EchoTools::default();
        let mut history = Vec::new();
        run_agent(&model, &tools, "sys", &mut history, "x".into())
            .await
            .unwrap();
        assert!(matches!(
            &history[2].content[0],
            ContentBlock::ToolResult { is_error: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_tool_rounds_are_capped() {
        let responses = (0..10)
            .map(|i| Ok(tool_response(&format!("tu_{i}"), "get_date_and_time", json!({}))))
            .collect();
        let model = ScriptedModel::new(responses);
        let tools = EchoTools::default();
        let mut history = Vec::new();
        let answer = run_agent(&model, &tools, "sys", &mut history, "loop".into())
            .await
            .unwrap();

        assert_eq!(answer, TOOL_LIMIT_ANSWER);
        assert_eq!(*model.calls.lock().await, MAX_TOOL_ROUNDS);
        assert_eq!(history.last().unwrap(), &Message::assistant_text(TOOL_LIMIT_ANSWER));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = ScriptedModel::new(vec![Err(LlmError::Api {
            status: 400,
            message: "bad".into(),
        })]);
        let tools = EchoTools::default();
        let mut history = Vec::new();
        let result = run_agent(&model, &tools, "sys", &mut history, "x".into()).await;
        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
    }

    #[test]
    fn test_normalize_unwraps_answer_json() {
        assert_eq!(normalize_answer(r#"{"answer": "Hi there"}"#), "Hi there");
        assert_eq!(
            normalize_answer("```json\n{\"answer\": \"Fenced\"}\n```"),
            "Fenced"
        );
        assert_eq!(
            normalize_answer("Sure! {\"answer\": \"Embedded\"} done"),
            "Embedded"
        );
    }

    #[test]
    fn test_normalize_keeps_plain_text_and_defaults_empty() {
        assert_eq!(normalize_answer("  Plain reply  "), "Plain reply");
        assert_eq!(normalize_answer("{not json}"), "{not json}");
        assert_eq!(normalize_answer("   "), DEFAULT_ANSWER);
    }
}
