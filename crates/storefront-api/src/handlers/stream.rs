use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};
use uuid::Uuid;

use storefront_chat::ChatEvent;
use crate::{
    error::{ApiError, ApiResult},
    routes::chat::ChatMessageRequest,
    state::AppState,
};

fn to_sse_event(event: &ChatEvent) -> Event {
    let name = match event {
        ChatEvent::Fragment { .. } => "message",
        ChatEvent::Completed { .. } => "done",
        ChatEvent::Failed { .. } => "error",
    };
    
    Event::default()
        .event(name)
        .json_data(event)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

/// Send a message and stream the reply using Server-Sent Events
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }
    
    let event_receiver = state.chat.send_stream(&req.user_id, &req.message);
    let sse_stream = ReceiverStream::new(event_receiver)
        .map(|event| Ok::<Event, Infallible>(to_sse_event(&event)));
    
    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

/// Real-time chat: every text frame is one turn
pub async fn chat_socket(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!(client_id = %client_id, "New chat WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

async fn handle_socket(mut socket: WebSocket, client_id: String, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    debug!(%connection_id, client_id = %client_id, "Chat WebSocket upgraded");
    
    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        
        let mut events = state.chat.send_stream(&client_id, &text);
        while let Some(event) = events.recv().await {
            let outgoing = match &event {
                ChatEvent::Fragment { content } => WsMessage::Text(content.clone()),
                terminal => match serde_json::to_string(terminal) {
                    Ok(json) => WsMessage::Text(json),
                    Err(_) => continue,
                },
            };
            if socket.send(outgoing).await.is_err() {
                debug!(%connection_id, "Chat WebSocket closed while streaming");
                return;
            }
        }
    }
    
    info!(%connection_id, client_id = %client_id, "Chat WebSocket disconnected");
}
