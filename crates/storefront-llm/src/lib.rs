pub mod types;
pub mod traits;
pub mod streaming;
pub mod openai;
pub mod config;

pub use traits::{ChatClient, ChatRequest, ChatOptions};
pub use streaming::{EventStream, StreamEvent};
pub use openai::OpenAIClient;
pub use config::{ClientFactory, OpenAIConfig, ProviderConfig};
pub use types::{Message, Role};
