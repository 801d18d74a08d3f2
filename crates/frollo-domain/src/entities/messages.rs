//! In-app messages.

use super::Entity;
use crate::wire::{flag, text};
use cache_database::tables::{self, TableSchema};
use cache_reconciler::{Record, Scope};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub event: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub interacted: bool,
    pub content_type: String,
    #[serde(default)]
    pub message_types: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub action: Option<serde_json::Value>,
}

impl Record for Message {
    const TABLE: TableSchema = tables::MESSAGES;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("event", text(&self.event)),
            ("read", flag(self.read)),
            ("interacted", flag(self.interacted)),
            ("content_type", text(&self.content_type)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub event: Option<String>,
    pub read: Option<bool>,
    pub interacted: Option<bool>,
    pub content_type: Option<String>,
}

impl MessageFilter {
    pub fn unread() -> Self {
        Self {
            read: Some(false),
            ..Default::default()
        }
    }
}

impl Entity for Message {
    type Filter = MessageFilter;

    fn endpoint(_: &MessageFilter) -> String {
        "messages".to_string()
    }

    fn scope(filter: &MessageFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(event) = &filter.event {
            scope = scope.eq("event", "event", event.as_str());
        }
        if let Some(read) = filter.read {
            scope = scope.eq("read", "read", read);
        }
        if let Some(interacted) = filter.interacted {
            scope = scope.eq("interacted", "interacted", interacted);
        }
        if let Some(content_type) = &filter.content_type {
            scope = scope.eq("content_type", "content_type", content_type.as_str());
        }
        scope
    }
}
