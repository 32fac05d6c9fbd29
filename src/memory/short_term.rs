//! In-RAM short-term memory for an agent loop.
//!
//! A recency buffer of [`MemoryItem`]s with optional per-session filtering.
//! Nothing here is persisted or embedded — this sits alongside the vector
//! store as the fast, ephemeral half of the memory system.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What a short-term item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// A user query.
    Query,
    /// A distilled fact.
    Fact,
    /// Output captured from a tool invocation.
    ToolOutput,
}

/// One short-term memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub kind: MemoryKind,
    pub content: String,
    /// RFC 3339 timestamp, stamped at insertion.
    pub timestamp: String,
    pub session_id: Option<String>,
}

impl MemoryItem {
    /// Build an item stamped with the current time.
    pub fn new(kind: MemoryKind, content: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339(),
            session_id,
        }
    }
}

/// Simple in-RAM short-term memory.
#[derive(Debug, Default)]
pub struct ShortTermMemory {
    items: Vec<MemoryItem>,
}

impl ShortTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: MemoryItem) {
        self.items.push(item);
    }

    /// The last `k` items in insertion order, optionally restricted to one
    /// session.
    pub fn recent(&self, k: usize, session_id: Option<&str>) -> Vec<MemoryItem> {
        let filtered: Vec<&MemoryItem> = match session_id {
            None => self.items.iter().collect(),
            Some(sid) => self
                .items
                .iter()
                .filter(|m| m.session_id.as_deref() == Some(sid))
                .collect(),
        };
        filtered
            .into_iter()
            .rev()
            .take(k)
            .rev()
            .cloned()
            .collect()
    }

    /// Drop everything, or only one session's items.
    pub fn clear(&mut self, session_id: Option<&str>) {
        match session_id {
            None => self.items.clear(),
            Some(sid) => self.items.retain(|m| m.session_id.as_deref() != Some(sid)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
