use futures::StreamExt;
use std::sync::Arc;
use storefront_llm::{ChatClient, ChatOptions, ChatRequest, Message, StreamEvent};
use storefront_store::{ChatHistoryEntry, Product};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{ChatError, Result};
use crate::events::ChatEvent;
use crate::history::ChatHistoryLog;
use crate::prompt::InventoryPrompt;
use crate::store::SessionStore;
use crate::trim::trim_transcript;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    /// Upper bound on messages forwarded per turn, system message included
    pub max_messages: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_messages: 10,
        }
    }
}

/// Runs chat turns against the completion provider.
///
/// Sessions, history and the inventory prompt are injected so the manager
/// itself holds no global state.
#[derive(Clone)]
pub struct ChatSessionManager {
    client: Arc<dyn ChatClient>,
    sessions: Arc<dyn SessionStore>,
    history: Arc<dyn ChatHistoryLog>,
    prompt: Arc<InventoryPrompt>,
    settings: ChatSettings,
}

impl ChatSessionManager {
    pub fn new(
        client: Arc<dyn ChatClient>,
        sessions: Arc<dyn SessionStore>,
        history: Arc<dyn ChatHistoryLog>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            client,
            sessions,
            history,
            prompt: Arc::new(InventoryPrompt::default()),
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Rebuild the system instruction from the current catalog
    pub async fn refresh_inventory(&self, products: &[Product]) {
        self.prompt.refresh(products).await;
    }

    pub async fn system_prompt(&self) -> String {
        self.prompt.current().await
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<ChatHistoryEntry>> {
        self.history.history(user_id).await
    }

    /// Run one turn and return the joined response
    pub async fn send(&self, user_id: &str, text: &str) -> Result<String> {
        self.run_turn(user_id, text, None).await
    }

    /// Run one turn in the background, forwarding fragments as they arrive.
    ///
    /// The channel always ends with `Completed` or `Failed`.
    pub fn send_stream(&self, user_id: &str, text: &str) -> mpsc::Receiver<ChatEvent> {
        let (tx, rx) = mpsc::channel(1000);

        let manager = self.clone();
        let user_id = user_id.to_string();
        let text = text.to_string();

        tokio::spawn(async move {
            let terminal = match manager.run_turn(&user_id, &text, Some(&tx)).await {
                Ok(response) => ChatEvent::Completed { response },
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Streamed chat turn failed");
                    ChatEvent::Failed { message: e.client_message().to_string() }
                }
            };
            let _ = tx.send(terminal).await;
        });

        rx
    }

    /// Build the upstream request after recording the user message
    async fn prepare(&self, user_id: &str, text: &str) -> Result<ChatRequest> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let session = self.sessions.append(user_id, Message::human(text)).await;

        let mut messages = Vec::with_capacity(session.transcript.len() + 1);
        messages.push(Message::system(self.prompt.current().await));
        messages.extend(session.transcript);
        let trimmed = trim_transcript(&messages, self.settings.max_messages);

        debug!(
            user_id,
            transcript = messages.len(),
            forwarded = trimmed.len(),
            "Prepared chat request"
        );

        let options = ChatOptions::new()
            .temperature(self.settings.temperature)
            .user(session.thread_token);
        Ok(ChatRequest::new(self.settings.model.clone(), trimmed).with_options(options))
    }

    async fn run_turn(
        &self,
        user_id: &str,
        text: &str,
        fragments: Option<&mpsc::Sender<ChatEvent>>,
    ) -> Result<String> {
        let request = self.prepare(user_id, text).await?;

        let mut stream = self
            .client
            .chat_stream(request)
            .await
            .map_err(ChatError::completion)?;

        let mut response = String::new();
        let mut finished = false;
        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Message { content }) => {
                    if let Some(tx) = fragments {
                        let _ = tx.send(ChatEvent::Fragment { content: content.clone() }).await;
                    }
                    response.push_str(&content);
                }
                Ok(StreamEvent::Done { .. }) => {
                    finished = true;
                    break;
                }
                Err(e) => {
                    warn!(user_id, error = %e, "Completion stream failed");
                    return Err(ChatError::completion(e));
                }
            }
        }

        if !finished {
            warn!(user_id, received = response.len(), "Completion stream ended early");
            return Err(ChatError::Interrupted);
        }

        self.sessions.append(user_id, Message::ai(response.clone())).await;
        self.history
            .append(ChatHistoryEntry::new(user_id, text, response.clone()))
            .await?;

        info!(user_id, chars = response.len(), "Chat turn completed");
        Ok(response)
    }
}
