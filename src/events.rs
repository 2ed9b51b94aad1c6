//! Session events and the sinks they are delivered to.
//!
//! The coordinator emits events through an [`EventSink`] handed to it at
//! construction. Delivery is fire-and-forget: a sink cannot fail the
//! operation that emitted the event.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEventType {
    SessionStarted,
    SessionEnded,
    SessionTaskCompleted,
    SessionFeatureCompleted,
}

impl SessionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "SESSION_STARTED",
            Self::SessionEnded => "SESSION_ENDED",
            Self::SessionTaskCompleted => "SESSION_TASK_COMPLETED",
            Self::SessionFeatureCompleted => "SESSION_FEATURE_COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEvent {
    pub event_type: SessionEventType,
    pub session_id: Uuid,
    pub epic_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Default sink: writes every event to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: SessionEvent) {
        tracing::info!(
            event = event.event_type.as_str(),
            session_id = %event.session_id,
            epic_id = %event.epic_id,
            payload = %event.payload,
            "Session event"
        );
    }
}

/// Keeps emitted events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().expect("event buffer poisoned").clone()
    }

    pub fn of_type(&self, event_type: SessionEventType) -> Vec<SessionEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: SessionEvent) {
        self.events.lock().expect("event buffer poisoned").push(event);
    }
}
