use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{Conversation, DomainError, Message};

type Shared = Arc<AsyncMutex<Conversation>>;

struct Slot {
    conversation: Shared,
    last_used: u64,
}

#[derive(Default)]
struct Slots {
    by_id: HashMap<String, Slot>,
    clock: u64,
}

impl Slots {
    /// Removes the least recently used conversation nobody is holding or waiting on.
    fn evict_idle(&mut self) -> Option<String> {
        let id = self
            .by_id
            .iter()
            .filter(|(_, slot)| Arc::strong_count(&slot.conversation) == 1)
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(id, _)| id.clone())?;
        self.by_id.remove(&id);
        Some(id)
    }
}

/// Process-local conversation histories keyed by external conversation id.
///
/// Each history sits behind its own async mutex; the outer map lock is only
/// held for lookup/insert, never across an await. With `max_conversations`
/// set, creating a conversation past the cap evicts the least recently used
/// idle one.
pub struct ConversationMemory {
    conversations: Mutex<Slots>,
    max_turns: Option<usize>,
    max_conversations: Option<usize>,
}

impl ConversationMemory {
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            conversations: Mutex::new(Slots::default()),
            max_turns,
            max_conversations: None,
        }
    }

    pub fn with_max_conversations(mut self, max_conversations: Option<usize>) -> Self {
        self.max_conversations = max_conversations;
        self
    }

    fn entry(&self, conversation_id: &str) -> Result<Shared, DomainError> {
        let mut slots = self
            .conversations
            .lock()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        slots.clock += 1;
        let now = slots.clock;

        if let Some(slot) = slots.by_id.get_mut(conversation_id) {
            slot.last_used = now;
            return Ok(slot.conversation.clone());
        }

        if let Some(max) = self.max_conversations {
            while slots.by_id.len() >= max {
                match slots.evict_idle() {
                    Some(evicted) => tracing::debug!(evicted = %evicted, "conversation evicted"),
                    None => {
                        tracing::warn!(
                            active = slots.by_id.len(),
                            "all conversations busy, exceeding max_conversations"
                        );
                        break;
                    }
                }
            }
        }

        let conversation = Arc::new(AsyncMutex::new(Conversation::new(conversation_id)));
        slots.by_id.insert(
            conversation_id.to_string(),
            Slot {
                conversation: conversation.clone(),
                last_used: now,
            },
        );
        Ok(conversation)
    }

    /// Exclusive access to one conversation, created on first use.
    pub async fn lock(&self, conversation_id: &str) -> Result<ConversationGuard, DomainError> {
        let entry = self.entry(conversation_id)?;
        Ok(ConversationGuard {
            guard: entry.lock_owned().await,
            max_turns: self.max_turns,
        })
    }

    /// Releases `conversation` and forgets it if it holds no messages and
    /// no other caller is waiting on it.
    pub fn discard_if_empty(&self, conversation: ConversationGuard) {
        if !conversation.messages().is_empty() {
            return;
        }
        let id = conversation.guard.id.clone();
        drop(conversation);

        let Ok(mut slots) = self.conversations.lock() else {
            return;
        };
        let idle_and_empty = slots.by_id.get(&id).is_some_and(|slot| {
            Arc::strong_count(&slot.conversation) == 1
                && slot
                    .conversation
                    .try_lock()
                    .is_ok_and(|c| c.is_empty())
        });
        if idle_and_empty {
            slots.by_id.remove(&id);
            tracing::debug!(conversation_id = %id, "empty conversation discarded");
        }
    }

    /// Snapshot of a conversation's messages; empty when unknown.
    pub async fn history(&self, conversation_id: &str) -> Result<Vec<Message>, DomainError> {
        let entry = {
            let slots = self
                .conversations
                .lock()
                .map_err(|e| DomainError::internal(e.to_string()))?;
            slots
                .by_id
                .get(conversation_id)
                .map(|slot| slot.conversation.clone())
        };

        match entry {
            Some(conversation) => Ok(conversation.lock().await.messages.clone()),
            None => Ok(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.conversations.lock().map(|s| s.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ConversationGuard {
    guard: OwnedMutexGuard<Conversation>,
    max_turns: Option<usize>,
}

impl ConversationGuard {
    pub fn messages(&self) -> &[Message] {
        &self.guard.messages
    }

    pub fn record_turn(&mut self, question: &str, answer: &str) {
        self.guard.record_turn(question, answer);
        if let Some(max_turns) = self.max_turns {
            self.guard.truncate_to_turns(max_turns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_turns_are_isolated_per_conversation() {
        let memory = ConversationMemory::new(None);

        memory.lock("A").await.unwrap().record_turn("qa", "aa");

        assert_eq!(memory.history("A").await.unwrap().len(), 2);
        assert!(memory.history("B").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_max_turns_is_enforced() {
        let memory = ConversationMemory::new(Some(1));
        {
            let mut conv = memory.lock("A").await.unwrap();
            conv.record_turn("q1", "a1");
            conv.record_turn("q2", "a2");
        }

        let history = memory.history("A").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "q2");
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_per_conversation() {
        let memory = Arc::new(ConversationMemory::new(None));
        let held = memory.lock("A").await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), memory.lock("A")).await;
        assert!(blocked.is_err());

        let other = tokio::time::timeout(Duration::from_millis(50), memory.lock("B")).await;
        assert!(other.is_ok());

        drop(held);
        assert!(memory.lock("A").await.is_ok());
    }

    #[tokio::test]
    async fn test_least_recently_used_conversation_is_evicted() {
        let memory = ConversationMemory::new(None).with_max_conversations(Some(2));

        memory.lock("A").await.unwrap().record_turn("qa", "aa");
        memory.lock("B").await.unwrap().record_turn("qb", "ab");
        memory.lock("A").await.unwrap().record_turn("qa2", "aa2");
        memory.lock("C").await.unwrap().record_turn("qc", "ac");

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.history("A").await.unwrap().len(), 4);
        assert!(memory.history("B").await.unwrap().is_empty());
        assert_eq!(memory.history("C").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_held_conversation_is_never_evicted() {
        let memory = ConversationMemory::new(None).with_max_conversations(Some(1));
        let mut held = memory.lock("A").await.unwrap();

        memory.lock("B").await.unwrap().record_turn("qb", "ab");
        held.record_turn("qa", "aa");
        drop(held);

        assert_eq!(memory.history("A").await.unwrap().len(), 2);
        memory.lock("C").await.unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn test_discard_if_empty_forgets_only_empty_conversations() {
        let memory = ConversationMemory::new(None);

        let fresh = memory.lock("A").await.unwrap();
        memory.discard_if_empty(fresh);
        assert!(memory.is_empty());

        memory.lock("B").await.unwrap().record_turn("qb", "ab");
        let used = memory.lock("B").await.unwrap();
        memory.discard_if_empty(used);
        assert_eq!(memory.len(), 1);
    }
}
