use std::pin::Pin;
use anyhow::Result;
use reqwest::Response;
use std::collections::VecDeque;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Boxed stream of completion events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },
    
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }
    
    pub fn is_done(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .is_some()
    }
    
    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        
        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }
            
            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }
        
        events
    }
}

/// Parse a `text/event-stream` chat completion body into events.
///
/// Emits at most one `Done`: the first of a `finish_reason` chunk or the `[DONE]` marker.
pub fn parse_chat_sse_stream(response: Response) -> EventStream {
    parse_sse_bytes(response.bytes_stream())
}

pub(crate) fn parse_sse_bytes<S, B, E>(stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);
        let mut finished = false;
        
        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref().iter().copied());
                    
                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                        
                        let line = match std::str::from_utf8(&line_bytes) {
                            Ok(line_str) => line_str.trim(),
                            Err(e) => {
                                yield Err(anyhow::anyhow!("Invalid UTF-8 in stream: {}", e));
                                continue;
                            }
                        };
                        
                        if line.is_empty() {
                            continue;
                        }
                        
                        if let Some(data) = line.strip_prefix("data:") {
                            let data = data.trim_start();
                            if data == "[DONE]" {
                                if !finished {
                                    yield Ok(StreamEvent::Done { finish_reason: None });
                                }
                                break 'outer;
                            }
                            
                            match serde_json::from_str::<ChatStreamChunk>(data) {
                                Ok(chunk) => {
                                    for event in chunk.to_stream_events() {
                                        if matches!(event, StreamEvent::Done { .. }) {
                                            if finished {
                                                continue;
                                            }
                                            finished = true;
                                        }
                                        yield Ok(event);
                                    }
                                }
                                Err(e) => yield Err(anyhow::anyhow!("Failed to parse chat chunk: {}", e)),
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunk(content: Option<&str>, finish: Option<&str>) -> String {
        let value = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "delta": { "content": content },
                "finish_reason": finish,
            }]
        });
        format!("data: {}\n\n", value)
    }

    async fn collect(parts: Vec<String>) -> Vec<Result<StreamEvent>> {
        let source = stream::iter(
            parts.into_iter().map(|p| Ok::<_, std::io::Error>(p.into_bytes())),
        );
        parse_sse_bytes(source).collect().await
    }

    #[tokio::test]
    async fn test_fragments_split_across_chunks() {
        let body = format!("{}{}", chunk(Some("Hel"), None), chunk(Some("lo"), None));
        let (a, b) = body.split_at(17);
        let events = collect(vec![a.to_string(), b.to_string(), "data: [DONE]\n".to_string()]).await;
        
        let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(events, vec![
            StreamEvent::Message { content: "Hel".to_string() },
            StreamEvent::Message { content: "lo".to_string() },
            StreamEvent::Done { finish_reason: None },
        ]);
    }

    #[tokio::test]
    async fn test_single_done_when_finish_reason_precedes_marker() {
        let events = collect(vec![
            chunk(Some("Hi"), None),
            chunk(None, Some("stop")),
            "data: [DONE]\n\n".to_string(),
        ]).await;
        
        let dones = events
            .iter()
            .filter(|e| matches!(e, Ok(StreamEvent::Done { .. })))
            .count();
        assert_eq!(dones, 1);
    }

    #[tokio::test]
    async fn test_no_done_when_body_is_cut() {
        let events = collect(vec![chunk(Some("partial"), None)]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(StreamEvent::Message { .. })));
    }

    #[tokio::test]
    async fn test_malformed_chunk_is_an_error() {
        let events = collect(vec!["data: {not json}\n".to_string()]).await;
        assert!(events[0].is_err());
    }
}
