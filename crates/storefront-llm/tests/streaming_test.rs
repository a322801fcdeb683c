use futures::StreamExt;
use storefront_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient, StreamEvent};

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [{ "index": 0, "delta": { "content": fragment }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_chat_stream_yields_fragments_then_done() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "stream": true,
            "user": "user_42",
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&["The ", "Galaxy ", "S22"]))
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let request = ChatRequest::new("gpt-4o-mini", vec![Message::human("phones?")])
        .with_options(ChatOptions::new().user("user_42"));

    let events: Vec<StreamEvent> = client
        .chat_stream(request)
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    mock.assert_async().await;
    let text: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Message { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "The Galaxy S22");
    assert_eq!(events.last(), Some(&StreamEvent::Done { finish_reason: None }));
}

#[tokio::test]
async fn test_chat_stream_surfaces_http_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let result = client
        .chat_stream(ChatRequest::new("gpt-4o-mini", vec![Message::human("hi")]))
        .await;

    let err = result.err().expect("expected an error").to_string();
    assert!(err.contains("503"));
}

#[tokio::test]
async fn test_chat_non_streaming() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Hello!" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let response = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("hi")]))
        .await
        .unwrap();

    assert_eq!(response.content.as_deref(), Some("Hello!"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 7);
}
