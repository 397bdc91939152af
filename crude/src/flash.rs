//! Flash messages for view mode
//!
//! After a create, update or delete in view mode the client is redirected and
//! the outcome travels on the flash channel: one-time messages stored in the
//! session and consumed by the next render.
//!
//! # Example
//!
//! ```rust,ignore
//! use crude::flash::{self, FlashMessage};
//! use tower_sessions::Session;
//!
//! async fn after_redirect(session: Session) -> crude::Result<()> {
//!     flash::push(&session, FlashMessage::success("Post created")).await?;
//!     let pending = flash::take(&session).await?;
//!     assert_eq!(pending.len(), 1);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key flash messages are stored under in the session
pub const FLASH_SESSION_KEY: &str = "_flash_messages";

/// Flash message category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

impl FlashKind {
    /// CSS class for templates
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Error => "flash-error",
        }
    }
}

/// A one-time message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    /// Category
    pub kind: FlashKind,
    /// Text shown to the user
    pub message: String,
}

impl FlashMessage {
    /// Success message
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    /// Error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Template form: `{kind, message, class}`
    #[must_use]
    pub fn to_context(&self) -> Value {
        json!({
            "kind": self.kind,
            "message": self.message,
            "class": self.kind.css_class(),
        })
    }
}

/// Template form of pending messages, inserted under `flash` in render contexts
#[must_use]
pub fn render_context(messages: &[FlashMessage]) -> Value {
    Value::Array(messages.iter().map(FlashMessage::to_context).collect())
}

#[cfg(feature = "session")]
pub use session_store::{push, take};

#[cfg(feature = "session")]
mod session_store {
    use tower_sessions::Session;

    use super::{FlashMessage, FLASH_SESSION_KEY};
    use crate::error::{Error, Result};

    /// Queue a message for the next render
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if the session store fails.
    pub async fn push(session: &Session, message: FlashMessage) -> Result<()> {
        let mut messages: Vec<FlashMessage> = session
            .get(FLASH_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read flash messages: {e}")))?
            .unwrap_or_default();

        messages.push(message);

        session
            .insert(FLASH_SESSION_KEY, &messages)
            .await
            .map_err(|e| Error::Session(format!("Failed to write flash messages: {e}")))
    }

    /// Read and clear pending messages
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if the session store fails.
    pub async fn take(session: &Session) -> Result<Vec<FlashMessage>> {
        let messages: Option<Vec<FlashMessage>> = session
            .remove(FLASH_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read flash messages: {e}")))?;
        Ok(messages.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ok = FlashMessage::success("Done");
        assert_eq!(ok.kind, FlashKind::Success);
        assert_eq!(ok.kind.css_class(), "flash-success");

        let err = FlashMessage::error("Failed");
        assert_eq!(err.kind, FlashKind::Error);
        assert_eq!(err.kind.css_class(), "flash-error");
    }

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_value(FlashMessage::error("x")).unwrap(),
            serde_json::json!({"kind": "error", "message": "x"})
        );
    }

    #[test]
    fn test_render_context_carries_css_class() {
        let context = render_context(&[FlashMessage::success("Saved")]);
        assert_eq!(
            context,
            serde_json::json!([{"kind": "success", "message": "Saved", "class": "flash-success"}])
        );
    }

    #[cfg(feature = "session")]
    #[tokio::test]
    async fn test_push_then_take_consumes() {
        use std::sync::Arc;
        use tower_sessions::Session;
        use tower_sessions_memory_store::MemoryStore;

        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push(&session, FlashMessage::success("one")).await.unwrap();
        push(&session, FlashMessage::error("two")).await.unwrap();

        let messages = take(&session).await.unwrap();
        assert_eq!(
            messages,
            vec![FlashMessage::success("one"), FlashMessage::error("two")]
        );
        assert!(take(&session).await.unwrap().is_empty());
    }
}
