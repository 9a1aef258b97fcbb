//! Event emission abstraction.
//!
//! The controller never hands the view a mutable alias of its lists. It
//! emits JSON change notifications through an `EventSink`, and the view
//! redraws from them or from a read-only snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// List contents changed (payload: [`ListChangedPayload`]).
pub const EVENT_LIST_CHANGED: &str = "list-changed";
/// View mode switched (payload: [`ViewModePayload`]).
pub const EVENT_VIEW_MODE_CHANGED: &str = "view-mode-changed";
/// Selection mode or membership changed (payload: [`SelectionPayload`]).
pub const EVENT_SELECTION_CHANGED: &str = "selection-changed";
/// Short non-blocking user notification (payload: [`NoticePayload`]).
pub const EVENT_NOTICE: &str = "notice";

/// Trait for emitting events to the frontend.
pub trait EventSink: Send + Sync {
    /// Emit an event with the given name and JSON payload.
    ///
    /// # Arguments
    /// * `event_name` - The name of the event (e.g., "list-changed")
    /// * `payload_json` - JSON-serialized payload string
    fn emit(&self, event_name: &str, payload_json: &str);
}

/// Extension trait for EventSink that provides typed emit functionality.
pub trait EventSinkExt {
    /// Emit an event with a typed payload that will be serialized to JSON.
    fn emit_typed<T: Serialize>(&self, event_name: &str, payload: &T);
}

impl<S: EventSink + ?Sized> EventSinkExt for S {
    fn emit_typed<T: Serialize>(&self, event_name: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => self.emit(event_name, &json),
            Err(e) => {
                tracing::error!("Failed to serialize event payload: {}", e);
            }
        }
    }
}

/// Shared reference to an EventSink implementation.
pub type SharedEventSink = Arc<dyn EventSink>;

/// No-op event sink for when events are not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event_name: &str, _payload_json: &str) {}
}

/// Logging event sink for debugging purposes.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        tracing::debug!(event = event_name, payload = payload_json, "Event emitted");
    }
}

/// An event as received on the consumer side of a [`ChannelEventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: String,
}

impl EmittedEvent {
    /// Decode the JSON payload.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.payload)
    }
}

/// Event sink that forwards into an unbounded channel.
///
/// Delivery keeps emission order and has exactly one consumer.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<EmittedEvent>,
}

impl ChannelEventSink {
    /// Create a sink together with its receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EmittedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        // receiver gone means the view was destroyed; drop the event
        let _ = self.tx.send(EmittedEvent {
            name: event_name.to_string(),
            payload: payload_json.to_string(),
        });
    }
}

/// Which collection a list event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Folders,
    Images,
}

/// One structural change to a displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "camelCase")]
pub enum ListChange {
    /// Whole list replaced.
    Reset,
    /// Row at index redrawn in place (e.g. highlight toggled).
    Changed(usize),
    /// Row inserted at index.
    Inserted(usize),
    /// Row removed at index (indices refer to the list at the time of removal).
    Removed(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangedPayload {
    pub list: ListKind,
    pub len: usize,
    pub changes: Vec<ListChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModePayload {
    pub list: ListKind,
    pub folder_id: Option<i64>,
    /// Path-style header, e.g. "/home/Trip".
    pub title: String,
    pub grid_columns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub list: ListKind,
    pub selecting: bool,
    pub selected: Vec<usize>,
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticePayload {
    pub level: NoticeLevel,
    pub message: String,
    /// Error code when `level` is `Error`.
    pub code: Option<String>,
}
