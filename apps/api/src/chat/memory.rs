//! Per-session conversation history.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use crate::llm_client::Message;

/// Messages kept per session after each turn.
pub const MAX_HISTORY_MESSAGES: usize = 40;

/// Carried in `AppState` as `Arc<dyn ConversationStore>`.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Empty history for unknown sessions and for unreadable stored history.
    /// Errors mean the store itself could not be reached.
    async fn load(&self, session_id: &str) -> Result<Vec<Message>>;
    async fn save(&self, session_id: &str, history: &[Message]) -> Result<()>;
}

/// JSON-encoded history under `chat:session:{id}` with a sliding TTL.
pub struct RedisConversationStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisConversationStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(session_id: &str) -> String {
        format!("chat:session:{session_id}")
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("Redis connection failed")?;
        let raw: Option<String> = conn.get(Self::key(session_id)).await?;
        let Some(json) = raw else {
            return Ok(Vec::new());
        };
        // Unreadable history is discarded and replaced on the next save.
        Ok(parse_history(session_id, &json))
    }

    async fn save(&self, session_id: &str, history: &[Message]) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("Redis connection failed")?;
        let json = serde_json::to_string(history)?;
        conn.set_ex::<_, _, ()>(Self::key(session_id), json, self.ttl_secs)
            .await?;
        Ok(())
    }
}

fn parse_history(session_id: &str, json: &str) -> Vec<Message> {
    serde_json::from_str(json).unwrap_or_else(|e| {
        warn!("Discarding corrupt history for session {session_id}: {e}");
        Vec::new()
    })
}

/// Keeps the newest `max` messages, then drops leading turns until the
/// history starts with a typed user message. Tool results never lead.
pub fn trim_history(history: &mut Vec<Message>, max: usize) {
    if history.len() > max {
        history.drain(..history.len() - max);
    }
    let start = history
        .iter()
        .position(Message::is_user_text)
        .unwrap_or(history.len());
    history.drain(..start);
}


#[cfg(test)]
mod tests {
    use super::testing::InMemoryConversationStore;
    use super::*;
    use crate::llm_client::{ContentBlock, Role};

    fn tool_result_turn() -> Message {
        Message {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: "tu_1".to_string(),
                content: "[]".to_string(),
                is_error: false,
            }],
        }
    }

    #[test]
    fn test_trim_keeps_newest_messages() {
        let mut history: Vec<Message> = (0..50)
            .flat_map(|i| {
                [
                    Message::user_text(format!("q{i}")),
                    Message::assistant_text(format!("a{i}")),
                ]
            })
            .collect();
        trim_history(&mut history, MAX_HISTORY_MESSAGES);
        assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
        assert_eq!(history[0], Message::user_text("q30"));
        assert_eq!(history.last().unwrap(), &Message::assistant_text("a49"));
    }

    #[test]
    fn test_trim_never_starts_with_tool_results_or_assistant() {
        let mut history = vec![
            Message::assistant_text("stale"),
            tool_result_turn(),
            Message::assistant_text("done"),
            Message::user_text("next"),
            Message::assistant_text("reply"),
        ];
        trim_history(&mut history, 10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user_text("next"));
    }

    #[test]
    fn test_trim_without_user_text_empties_history() {
        let mut history = vec![Message::assistant_text("x"), tool_result_turn()];
        trim_history(&mut history, 10);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trips_by_session() {
        let store = InMemoryConversationStore::default();
        store
            .save("a", &[Message::user_text("hello")])
            .await
            .unwrap();
        assert_eq!(store.load("a").await.unwrap().len(), 1);
        assert!(store.load("b").await.unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_history_parses_as_empty() {
        assert!(parse_history("s1", "{not json").is_empty());
        let json = serde_json::to_string(&[Message::user_text("hi")]).unwrap();
        assert_eq!(parse_history("s1", &json), vec![Message::user_text("hi")]);
    }

    #[test]
    fn test_redis_key_is_namespaced() {
        assert_eq!(RedisConversationStore::key("s1"), "chat:session:s1");
    }
}
