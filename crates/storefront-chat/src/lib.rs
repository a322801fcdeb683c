mod error;
mod session;
mod store;
mod trim;
mod prompt;
mod history;
mod events;
mod manager;

pub use error::{ChatError, Result};
pub use session::ChatSession;
pub use store::{LruSessionStore, SessionStore};
pub use trim::trim_transcript;
pub use prompt::{build_inventory_prompt, InventoryPrompt};
pub use history::{ChatHistoryLog, MemoryChatHistory, StoreChatHistory};
pub use events::ChatEvent;
pub use manager::{ChatSessionManager, ChatSettings};
