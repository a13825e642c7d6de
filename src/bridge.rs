use serde::Deserialize;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Display geometry
// ---------------------------------------------------------------------------

/// Glass display width in device pixels.
pub const SCREEN_WIDTH: u16 = 576;
/// Glass display height in device pixels.
pub const SCREEN_HEIGHT: u16 = 288;

// ---------------------------------------------------------------------------
// Render payloads
// ---------------------------------------------------------------------------

/// A positioned text block on the glass display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContainer {
    pub id: u8,
    pub name: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Non-zero draws a selection border around the block.
    pub border_width: u16,
    pub content: String,
    /// Whether input events are attributed to this container.
    pub event_capture: bool,
}

/// A selectable list of item labels. Selection is tracked by the device; a
/// click reports the selected index back through [`ListEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContainer {
    pub id: u8,
    pub name: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub item_names: Vec<String>,
    pub select_border: bool,
}

/// One full replacement of the on-glass container set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSpec {
    pub texts: Vec<TextContainer>,
    pub lists: Vec<ListContainer>,
}

impl PageSpec {
    pub fn container_total(&self) -> usize {
        self.texts.len() + self.lists.len()
    }
}

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// Raw event-kind codes used by the typed sub-objects.
pub const OS_EVENT_CLICK: i64 = 0;
pub const OS_EVENT_SCROLL_TOP: i64 = 1;
pub const OS_EVENT_SCROLL_BOTTOM: i64 = 2;
pub const OS_EVENT_DOUBLE_CLICK: i64 = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEvent {
    pub event_type: Option<i64>,
    pub current_select_item_index: Option<i64>,
    pub current_select_item_name: Option<String>,
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextEvent {
    pub event_type: Option<i64>,
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SysEvent {
    pub event_type: Option<i64>,
}

/// A raw input event as delivered by the bridge.
///
/// Depending on the transport path the event kind arrives in one of the
/// typed sub-objects or buried in the loose `json_data` blob, with varying
/// key casing. [`normalize_gesture`] folds all of that into [`Gesture`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubEvent {
    pub list_event: Option<ListEvent>,
    pub text_event: Option<TextEvent>,
    pub sys_event: Option<SysEvent>,
    pub json_data: Option<serde_json::Value>,
}

impl HubEvent {
    /// Bare click as the device reports a tap.
    pub fn click() -> Self {
        Self {
            sys_event: Some(SysEvent {
                event_type: Some(OS_EVENT_CLICK),
            }),
            ..Default::default()
        }
    }

    pub fn double_click() -> Self {
        Self {
            sys_event: Some(SysEvent {
                event_type: Some(OS_EVENT_DOUBLE_CLICK),
            }),
            ..Default::default()
        }
    }

    pub fn scroll_up() -> Self {
        Self {
            sys_event: Some(SysEvent {
                event_type: Some(OS_EVENT_SCROLL_TOP),
            }),
            ..Default::default()
        }
    }

    pub fn scroll_down() -> Self {
        Self {
            sys_event: Some(SysEvent {
                event_type: Some(OS_EVENT_SCROLL_BOTTOM),
            }),
            ..Default::default()
        }
    }

    /// Selection click reported by a list container.
    pub fn list_click(index: i64) -> Self {
        Self {
            list_event: Some(ListEvent {
                event_type: Some(OS_EVENT_CLICK),
                current_select_item_index: Some(index),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Normalized input gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    DoubleClick,
    ScrollUp,
    ScrollDown,
    Unknown,
}

/// Pull the raw event kind out of an event: typed sub-objects first, then
/// the loose blob under its known key spellings.
fn raw_event_type(event: &HubEvent) -> Option<serde_json::Value> {
    let typed = event
        .list_event
        .as_ref()
        .and_then(|e| e.event_type)
        .or_else(|| event.text_event.as_ref().and_then(|e| e.event_type))
        .or_else(|| event.sys_event.as_ref().and_then(|e| e.event_type));
    if let Some(kind) = typed {
        return Some(serde_json::Value::from(kind));
    }

    let raw = event.json_data.as_ref()?;
    for key in ["eventType", "event_type", "Event_Type", "type"] {
        if let Some(value) = raw.get(key) {
            return Some(value.clone());
        }
    }
    None
}

/// Map a raw event onto the closed gesture set.
///
/// An event that carries a typed sub-object but no kind at all is a click
/// (the device sends taps this way); an event with nothing recognizable is
/// `Unknown`, which the controller logs and ignores.
pub fn normalize_gesture(event: &HubEvent) -> Gesture {
    match raw_event_type(event) {
        Some(raw) => {
            if let Some(code) = raw.as_i64() {
                return match code {
                    OS_EVENT_CLICK => Gesture::Click,
                    OS_EVENT_SCROLL_TOP => Gesture::ScrollUp,
                    OS_EVENT_SCROLL_BOTTOM => Gesture::ScrollDown,
                    OS_EVENT_DOUBLE_CLICK => Gesture::DoubleClick,
                    _ => Gesture::Unknown,
                };
            }
            if let Some(text) = raw.as_str() {
                let text = text.to_uppercase();
                if text.contains("DOUBLE") {
                    return Gesture::DoubleClick;
                }
                if text.contains("CLICK") {
                    return Gesture::Click;
                }
                if text.contains("SCROLL_TOP") || text.contains("UP") {
                    return Gesture::ScrollUp;
                }
                if text.contains("SCROLL_BOTTOM") || text.contains("DOWN") {
                    return Gesture::ScrollDown;
                }
            }
            Gesture::Unknown
        }
        None => {
            let has_typed = event.list_event.is_some()
                || event.text_event.is_some()
                || event.sys_event.is_some();
            if has_typed {
                Gesture::Click
            } else {
                Gesture::Unknown
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bridge contract
// ---------------------------------------------------------------------------

/// Connection status notification. Informational only; the controller logs
/// it and never transitions on it.
#[derive(Debug, Clone, Default)]
pub struct DeviceStatus {
    pub connected: bool,
    pub serial: Option<String>,
}

/// Black-box host runtime: on-glass rendering plus string key-value storage.
///
/// `create_startup_page` returns the bridge result code; `0` means success
/// and anything else must be treated as a failed initialization by the
/// caller.
pub trait HubBridge {
    fn create_startup_page(&mut self, spec: &PageSpec) -> Result<i32>;
    fn rebuild_page(&mut self, spec: &PageSpec) -> Result<()>;
    fn get_local_storage(&mut self, key: &str) -> Result<Option<String>>;
    fn set_local_storage(&mut self, key: &str, value: &str) -> Result<()>;
}
