use serde::{Deserialize, Serialize};

/// Events emitted while a streaming turn runs.
///
/// A turn ends with exactly one of `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Fragment { content: String },
    Completed { response: String },
    Failed { message: String },
}

impl ChatEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}
