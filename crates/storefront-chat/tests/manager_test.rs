use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_chat::{
    ChatError, ChatEvent, ChatSessionManager, ChatSettings, LruSessionStore, MemoryChatHistory,
    SessionStore,
};
use storefront_llm::{ChatClient, ChatRequest, EventStream, Message, StreamEvent};
use storefront_store::Product;

enum Script {
    Reply(Vec<&'static str>),
    Cut(Vec<&'static str>),
    Refuse,
    Reject(&'static str),
}

/// Plays back scripted completions and records every request
#[derive(Default)]
struct ScriptedClient {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn with(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.into()), requests: Mutex::default() })
    }

    fn last_request(&self) -> ChatRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat_stream(&self, request: ChatRequest) -> anyhow::Result<EventStream> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front().unwrap_or(Script::Refuse);

        let (fragments, done) = match next {
            Script::Reply(parts) => (parts, true),
            Script::Cut(parts) => (parts, false),
            Script::Refuse => anyhow::bail!("provider unavailable"),
            Script::Reject(body) => anyhow::bail!("OpenAI API error (401 Unauthorized): {}", body),
        };
        let mut events: Vec<anyhow::Result<StreamEvent>> = fragments
            .into_iter()
            .map(|c| Ok(StreamEvent::Message { content: c.to_string() }))
            .collect();
        if done {
            events.push(Ok(StreamEvent::Done { finish_reason: Some("stop".to_string()) }));
        }
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

fn manager(client: Arc<ScriptedClient>) -> (ChatSessionManager, Arc<LruSessionStore>) {
    let sessions = Arc::new(LruSessionStore::new(100, Duration::from_secs(600)));
    let manager = ChatSessionManager::new(
        client,
        sessions.clone(),
        Arc::new(MemoryChatHistory::new()),
        ChatSettings::default(),
    );
    (manager, sessions)
}

#[tokio::test]
async fn test_send_joins_fragments_and_records_history() {
    let client = ScriptedClient::with(vec![Script::Reply(vec!["Hel", "lo", "!"])]);
    let (manager, sessions) = manager(client.clone());

    let response = manager.send("alice", "hi").await.unwrap();
    assert_eq!(response, "Hello!");

    let request = client.last_request();
    assert!(request.messages[0].is_system());
    assert_eq!(request.messages[1], Message::human("hi"));
    assert_eq!(request.options.user.as_deref(), Some("user_alice"));

    let session = sessions.get("alice").await.unwrap();
    assert_eq!(session.transcript, vec![Message::human("hi"), Message::ai("Hello!")]);

    let history = manager.history("alice").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].response, "Hello!");
}

#[tokio::test]
async fn test_forwarded_context_is_bounded() {
    let replies = (0..8).map(|_| Script::Reply(vec!["ok"])).collect();
    let client = ScriptedClient::with(replies);
    let (manager, _) = manager(client.clone());

    for i in 0..8 {
        manager.send("bob", &format!("q{i}")).await.unwrap();
    }

    let request = client.last_request();
    assert_eq!(request.messages.len(), 10);
    assert!(request.messages[0].is_system());
    assert_eq!(request.messages[9], Message::human("q7"));
}

#[tokio::test]
async fn test_provider_failure_keeps_user_message_only() {
    let client = ScriptedClient::with(vec![Script::Refuse]);
    let (manager, sessions) = manager(client);

    let err = manager.send("carol", "anyone there?").await.unwrap_err();
    assert!(matches!(err, ChatError::Completion(_)));

    let session = sessions.get("carol").await.unwrap();
    assert_eq!(session.transcript, vec![Message::human("anyone there?")]);
    assert!(manager.history("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cut_stream_is_an_explicit_failure() {
    let client = ScriptedClient::with(vec![Script::Cut(vec!["partial"])]);
    let (manager, _) = manager(client);

    let err = manager.send("dave", "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::Interrupted));
}

#[tokio::test]
async fn test_empty_message_rejected_before_provider() {
    let client = ScriptedClient::with(vec![]);
    let (manager, sessions) = manager(client.clone());

    assert!(matches!(manager.send("erin", "   ").await, Err(ChatError::EmptyMessage)));
    assert!(client.requests.lock().unwrap().is_empty());
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_stream_forwards_fragments_then_completes() {
    let client = ScriptedClient::with(vec![Script::Reply(vec!["a", "b"])]);
    let (manager, _) = manager(client);

    let mut rx = manager.send_stream("frank", "hi");
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            ChatEvent::Fragment { content: "a".to_string() },
            ChatEvent::Fragment { content: "b".to_string() },
            ChatEvent::Completed { response: "ab".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_stream_ends_with_failed_on_interruption() {
    let client = ScriptedClient::with(vec![Script::Cut(vec!["a"])]);
    let (manager, _) = manager(client);

    let mut rx = manager.send_stream("gina", "hi");
    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    assert!(matches!(last, Some(ChatEvent::Failed { .. })));
}

#[tokio::test]
async fn test_stream_failure_does_not_forward_provider_body() {
    let client = ScriptedClient::with(vec![Script::Reject(
        r#"{"error":{"message":"Incorrect API key provided: sk-live-SECRET"}}"#,
    )]);
    let (manager, _) = manager(client);

    let mut rx = manager.send_stream("hank", "hi");
    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }

    let Some(ChatEvent::Failed { message }) = last else {
        panic!("expected a failed terminal event");
    };
    assert_eq!(message, "Upstream service unavailable");
    assert!(!message.contains("sk-live-SECRET"));
}

#[tokio::test]
async fn test_interrupted_and_failed_streams_report_different_text() {
    let client = ScriptedClient::with(vec![Script::Cut(vec!["a"]), Script::Refuse]);
    let (manager, _) = manager(client);

    let mut messages = Vec::new();
    for user in ["ivy", "jack"] {
        let mut rx = manager.send_stream(user, "hi");
        while let Some(event) = rx.recv().await {
            if let ChatEvent::Failed { message } = event {
                messages.push(message);
            }
        }
    }
    assert_eq!(messages.len(), 2);
    assert_ne!(messages[0], messages[1]);
}

#[tokio::test]
async fn test_inventory_refresh_reaches_next_request() {
    let client = ScriptedClient::with(vec![Script::Reply(vec!["ok"])]);
    let (manager, _) = manager(client.clone());

    let laptop = Product {
        id: 1,
        name: "Laptop".to_string(),
        price: 999.0,
        description: "Fast".to_string(),
        stock: 2,
        category_id: None,
        image_url: None,
        rating: None,
        specs: Default::default(),
        labels: vec![],
        created_at: None,
        updated_at: None,
    };
    manager.refresh_inventory(&[laptop]).await;
    manager.send("hana", "what do you sell?").await.unwrap();

    let system = client.last_request().messages[0].content().to_string();
    assert!(system.contains("1. Laptop: $999, Stock: 2"));
}
