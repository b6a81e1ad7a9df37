//! Append-only record of successful exchanges.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A prompt and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub at: DateTime<Utc>,
}

/// Conversation history. Entries are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    exchanges: Vec<Exchange>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
        model: impl Into<String>,
    ) {
        self.exchanges.push(Exchange {
            prompt: prompt.into(),
            response: response.into(),
            model: model.into(),
            at: Utc::now(),
        });
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut memory = ConversationMemory::new();
        assert!(memory.is_empty());

        memory.record("first", "one", "gpt-4.1-mini");
        memory.record("second", "two", "gpt-4.1-nano");

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.exchanges()[0].prompt, "first");
        let last = memory.last().unwrap();
        assert_eq!(last.response, "two");
        assert_eq!(last.model, "gpt-4.1-nano");
        assert!(memory.exchanges()[0].at <= last.at);
    }
}
