//! Input events understood by the area selector
//!
//! Events are plain values so that any front end (a browser binding, a
//! terminal UI, or a JSON script replayed from the command line) can drive the
//! selector. Touch events are folded into the pointer model using the touch
//! identifier.

use serde::{Deserialize, Serialize};

use crate::domain::model::ParentBox;
use crate::selector::handle::Handle;

/// Identity of the pointer or touch that owns a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Pointer(u32),
    Touch(u32),
}

/// What a gesture started on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PointerTarget {
    /// The selection body: the gesture translates the box
    Body,
    /// A resize handle
    Handle(Handle),
}

impl TryFrom<String> for PointerTarget {
    type Error = crate::domain::errors::DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "body" {
            Ok(PointerTarget::Body)
        } else {
            Ok(PointerTarget::Handle(value.parse()?))
        }
    }
}

impl From<PointerTarget> for String {
    fn from(target: PointerTarget) -> Self {
        match target {
            PointerTarget::Body => "body".to_string(),
            PointerTarget::Handle(handle) => handle.id().to_string(),
        }
    }
}

/// A single pointer sample in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    pub page_x: f64,
    pub page_y: f64,
}

impl PointerSample {
    pub fn pointer(id: u32, page_x: f64, page_y: f64) -> Self {
        Self {
            id: PointerId::Pointer(id),
            page_x,
            page_y,
        }
    }

    pub fn touch(identifier: u32, page_x: f64, page_y: f64) -> Self {
        Self {
            id: PointerId::Touch(identifier),
            page_x,
            page_y,
        }
    }
}

/// Keys the selector reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other(value),
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::ArrowUp => "ArrowUp".to_string(),
            Key::ArrowDown => "ArrowDown".to_string(),
            Key::ArrowLeft => "ArrowLeft".to_string(),
            Key::ArrowRight => "ArrowRight".to_string(),
            Key::Other(other) => other,
        }
    }
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub meta: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Pixels moved per arrow press: 1, 10 with meta, 25 with meta+shift
    pub fn step(&self) -> f64 {
        match (self.meta, self.shift) {
            (true, true) => 25.0,
            (true, false) => 10.0,
            _ => 1.0,
        }
    }

    /// Whether arrows resize rather than move
    pub fn resizes(&self) -> bool {
        self.ctrl && self.alt
    }
}

/// A key press
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::default())
    }
}

/// Everything that can happen to a selector, in a serialisable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        pointer_id: u32,
        page_x: f64,
        page_y: f64,
        #[serde(default = "body_target")]
        target: PointerTarget,
    },
    PointerMove {
        pointer_id: u32,
        page_x: f64,
        page_y: f64,
    },
    PointerUp {
        pointer_id: u32,
        #[serde(default)]
        page_x: f64,
        #[serde(default)]
        page_y: f64,
    },
    PointerCancel {
        pointer_id: u32,
    },
    TouchStart {
        identifier: u32,
        page_x: f64,
        page_y: f64,
        #[serde(default = "body_target")]
        target: PointerTarget,
    },
    TouchMove {
        identifier: u32,
        page_x: f64,
        page_y: f64,
    },
    TouchEnd {
        identifier: u32,
    },
    KeyDown(KeyPress),
    Focus,
    Blur,
    WindowBlur,
    ParentResize {
        width: f64,
        height: f64,
    },
    Attach {
        width: f64,
        height: f64,
    },
    Detach,
}

fn body_target() -> PointerTarget {
    PointerTarget::Body
}

impl InputEvent {
    /// Parent rectangle carried by resize/attach events
    pub fn parent_box(&self) -> Option<ParentBox> {
        match self {
            InputEvent::ParentResize { width, height } | InputEvent::Attach { width, height } => {
                ParentBox::new(*width, *height).ok()
            }
            _ => None,
        }
    }
}
