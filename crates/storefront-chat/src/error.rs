use storefront_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Completion provider failed: {0}")]
    Completion(String),

    /// The stream ended without the provider signalling completion
    #[error("Completion stream was interrupted before it finished")]
    Interrupted,

    #[error("Chat history error: {0}")]
    History(#[from] StoreError),
}

impl ChatError {
    pub(crate) fn completion(err: anyhow::Error) -> Self {
        Self::Completion(err.to_string())
    }

    /// Text safe to hand to an end user; provider and store details stay in the logs
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "Message must not be empty",
            Self::Completion(_) => "Upstream service unavailable",
            Self::Interrupted => "Response was interrupted, please retry",
            Self::History(_) => "Chat history unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_provider_detail() {
        let err = ChatError::completion(anyhow::anyhow!("OpenAI API error (401): Incorrect API key sk-x"));
        assert!(err.to_string().contains("sk-x"));
        assert_eq!(err.client_message(), "Upstream service unavailable");
        assert_ne!(ChatError::Interrupted.client_message(), err.client_message());
        assert_ne!(ChatError::EmptyMessage.client_message(), err.client_message());
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
