//! Conversation state: the transcript, the draft being composed, and the
//! pending flag for an outstanding question round-trip.
//!
//! Pure data, no I/O. The transcript is append-only: once a message is
//! pushed it is never edited, reordered, or removed for the lifetime of the
//! session. Fields are private so every mutation goes through the methods
//! below; rendering re-reads the whole transcript each frame.

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// The single conversation session.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    draft: String,
    pending: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message to the transcript. Always succeeds; empty content
    /// is allowed.
    pub fn append(&mut self, role: ChatRole, content: String) {
        self.messages.push(ChatMessage { role, content });
    }

    /// Replace the draft unconditionally.
    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// True while a question round-trip is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.draft(), "");
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_append_grows_transcript_by_one() {
        let mut conversation = Conversation::new();
        conversation.append(ChatRole::User, "What is the refund policy?".to_string());
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, ChatRole::User);
        assert_eq!(
            conversation.messages()[0].content,
            "What is the refund policy?"
        );
    }

    #[test]
    fn test_append_allows_empty_content() {
        let mut conversation = Conversation::new();
        conversation.append(ChatRole::Assistant, String::new());
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].content, "");
    }

    #[test]
    fn test_append_preserves_order_and_existing_entries() {
        let mut conversation = Conversation::new();
        conversation.append(ChatRole::User, "first".to_string());
        conversation.append(ChatRole::Assistant, "second".to_string());
        let snapshot = conversation.messages()[0].clone();
        conversation.append(ChatRole::User, "third".to_string());

        assert_eq!(conversation.messages()[0], snapshot);
        let contents: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn test_set_draft_replaces_unconditionally() {
        let mut conversation = Conversation::new();
        conversation.set_draft("old".to_string());
        conversation.set_draft("new".to_string());
        assert_eq!(conversation.draft(), "new");
        conversation.set_draft(String::new());
        assert_eq!(conversation.draft(), "");
    }

    #[test]
    fn test_pending_flag_round_trip() {
        let mut conversation = Conversation::new();
        conversation.set_pending(true);
        assert!(conversation.is_pending());
        conversation.set_pending(false);
        assert!(!conversation.is_pending());
    }
}
