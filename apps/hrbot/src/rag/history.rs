use std::sync::Mutex;

use serde::Serialize;

use crate::rag::SourceRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Append-only, process-lifetime log of answered questions.
/// Shared between the engine and the fallback policy; never persisted.
#[derive(Debug, Default)]
pub struct ConversationLog {
    records: Mutex<Vec<ConversationRecord>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` and returns the log including it, under one lock.
    pub fn append(&self, record: ConversationRecord) -> Vec<ConversationRecord> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record);
        records.clone()
    }

    pub fn snapshot(&self) -> Vec<ConversationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(question: &str) -> ConversationRecord {
        ConversationRecord {
            question: question.to_string(),
            answer: "answer".to_string(),
            sources: vec![],
        }
    }

    #[test]
    fn test_append_returns_full_history_in_order() {
        let log = ConversationLog::new();
        log.append(record("first"));
        let history = log.append(record("second"));
        let questions: Vec<_> = history.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second"]);
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let log = Arc::new(ConversationLog::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append(record(&format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.snapshot().len(), 400);
    }
}
