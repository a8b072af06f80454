//! Append-only message log

use std::collections::HashSet;
use talkwave_core::{Content, Message, Sender};
use tracing::warn;

/// Ordered messages plus the id sequence that numbers them
///
/// Ids come from a counter, never from the length of the log, so an
/// inbound append racing a local one cannot produce a duplicate.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<Message>,
    /// `None` once the counter has passed `u64::MAX`
    next_id: Option<u64>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Resume from a stored snapshot; new ids start above the highest stored id
    pub fn from_snapshot(messages: Vec<Message>) -> Self {
        let next_id = match messages.iter().map(|m| m.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        Self { messages, next_id }
    }

    /// Append a message and return a copy of it
    pub fn append(&mut self, sender: Sender, author: Option<String>, content: Content) -> Message {
        let message = Message {
            id: self.allocate_id(),
            sender,
            author,
            content,
        };
        self.messages.push(message.clone());
        message
    }

    /// Next counter value, or the lowest free id once the counter is spent
    fn allocate_id(&mut self) -> u64 {
        if let Some(id) = self.next_id {
            self.next_id = id.checked_add(1);
            return id;
        }

        warn!("Message id counter exhausted, reusing the lowest free id");
        let used: HashSet<u64> = self.messages.iter().map(|m| m.id).collect();
        (1..=u64::MAX).find(|id| !used.contains(id)).unwrap_or_default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut log = ChatLog::new();
        let a = log.append(Sender::LocalUser, None, Content::text("a"));
        let b = log.append(Sender::RemoteUser, Some("Toi".into()), Content::text("b"));
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_snapshot_seeds_counter_from_highest_id() {
        // Snapshots written by length-based numbering can have gaps and repeats
        let stored = vec![
            Message::new(4, Sender::LocalUser, Content::text("x")),
            Message::new(2, Sender::RemoteUser, Content::text("y")),
            Message::new(4, Sender::RemoteUser, Content::text("z")),
        ];
        let mut log = ChatLog::from_snapshot(stored);
        let next = log.append(Sender::LocalUser, None, Content::text("new"));
        assert_eq!(next.id, 5);
        assert_eq!(log.messages()[3], next);
    }

    #[test]
    fn test_empty_snapshot_starts_at_one() {
        let mut log = ChatLog::from_snapshot(Vec::new());
        assert!(log.is_empty());
        assert_eq!(log.append(Sender::LocalUser, None, Content::Empty).id, 1);
    }

    #[test]
    fn test_snapshot_at_id_ceiling_keeps_ids_unique() {
        let stored = vec![
            Message::new(1, Sender::LocalUser, Content::text("a")),
            Message::new(u64::MAX, Sender::RemoteUser, Content::text("x")),
        ];
        let mut log = ChatLog::from_snapshot(stored);

        let first = log.append(Sender::LocalUser, None, Content::text("b"));
        let second = log.append(Sender::LocalUser, None, Content::text("c"));
        assert_eq!((first.id, second.id), (2, 3));

        let ids: HashSet<u64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), log.len());
    }

    #[test]
    fn test_counter_reaching_ceiling_does_not_wrap() {
        let mut log =
            ChatLog::from_snapshot(vec![Message::new(u64::MAX - 1, Sender::LocalUser, Content::Empty)]);

        assert_eq!(log.append(Sender::LocalUser, None, Content::Empty).id, u64::MAX);
        assert_eq!(log.append(Sender::LocalUser, None, Content::Empty).id, 1);
    }
}
