//! Interactive area selector
//!
//! [`AreaSelector`] is the rectangular crop region laid over the video frame.
//! It can be dragged from its body, resized from eight handles, and nudged or
//! resized from the keyboard while focused. Every handled input clamps the box
//! to the parent rectangle and notifies change listeners.
//!
//! The programmatic setters behave differently from interactive input: an
//! out-of-range value is rejected outright rather than clamped, which keeps
//! "maximize"-style conveniences from half-applying.

use tracing::{debug, trace};

use crate::domain::model::{clamp, BoundingBox, ParentBox, MIN_SIZE};

pub mod gesture;
pub mod handle;
pub mod input;


use gesture::{GestureKind, GlobalListener, ListenerScope, PointerContext};
use input::{InputEvent, Key, KeyPress, PointerSample, PointerTarget};

/// Identifier returned by [`AreaSelector::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangeListener = Box<dyn FnMut(&BoundingBox) + Send>;

/// Draggable, resizable, keyboard-operable selection rectangle
pub struct AreaSelector {
    bbox: BoundingBox,
    parent: Option<ParentBox>,
    gesture: Option<PointerContext>,
    focused: bool,
    scope: ListenerScope,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl Default for AreaSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AreaSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreaSelector")
            .field("bbox", &self.bbox)
            .field("parent", &self.parent)
            .field("gesture", &self.gesture)
            .field("focused", &self.focused)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AreaSelector {
    /// Create a detached selector with a minimum-size box at the origin
    pub fn new() -> Self {
        Self {
            bbox: BoundingBox::new(0.0, 0.0, MIN_SIZE, MIN_SIZE),
            parent: None,
            gesture: None,
            focused: false,
            scope: ListenerScope::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a selector attached to `parent` with the default selection
    pub fn attached(parent: ParentBox) -> Self {
        let mut selector = Self::new();
        selector.parent = Some(parent);
        selector.bbox = parent.default_selection();
        selector
    }

    pub fn x(&self) -> f64 {
        self.bbox.x
    }

    pub fn y(&self) -> f64 {
        self.bbox.y
    }

    pub fn width(&self) -> f64 {
        self.bbox.width
    }

    pub fn height(&self) -> f64 {
        self.bbox.height
    }

    /// Snapshot of the current geometry
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn parent(&self) -> Option<ParentBox> {
        self.parent
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether a pointer or touch gesture is in progress
    pub fn has_active_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Window-level listeners currently installed
    pub fn listeners(&self) -> &ListenerScope {
        &self.scope
    }

    /// Register a change listener, called after every geometry mutation
    pub fn subscribe(&mut self, listener: impl FnMut(&BoundingBox) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a change listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let bbox = self.bbox;
        trace!(%bbox, "selection changed");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&bbox);
        }
    }

    /// Dispatch any input event; returns whether the selector handled it
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { pointer_id, page_x, page_y, target } => {
                self.pointer_down(*target, PointerSample::pointer(*pointer_id, *page_x, *page_y))
            }
            InputEvent::PointerMove { pointer_id, page_x, page_y } => {
                self.pointer_move(PointerSample::pointer(*pointer_id, *page_x, *page_y))
            }
            InputEvent::PointerUp { pointer_id, page_x, page_y } => {
                self.pointer_up(PointerSample::pointer(*pointer_id, *page_x, *page_y))
            }
            InputEvent::PointerCancel { pointer_id } => {
                self.pointer_up(PointerSample::pointer(*pointer_id, 0.0, 0.0))
            }
            InputEvent::TouchStart { identifier, page_x, page_y, target } => {
                self.pointer_down(*target, PointerSample::touch(*identifier, *page_x, *page_y))
            }
            InputEvent::TouchMove { identifier, page_x, page_y } => {
                self.pointer_move(PointerSample::touch(*identifier, *page_x, *page_y))
            }
            InputEvent::TouchEnd { identifier } => {
                self.pointer_up(PointerSample::touch(*identifier, 0.0, 0.0))
            }
            InputEvent::KeyDown(press) => self.key_down(press),
            InputEvent::Focus => self.focus(),
            InputEvent::Blur => self.blur(),
            InputEvent::WindowBlur => self.window_blur(),
            InputEvent::ParentResize { .. } => match event.parent_box() {
                Some(parent) => self.observe_parent(parent),
                None => false,
            },
            InputEvent::Attach { .. } => match event.parent_box() {
                Some(parent) => self.attach(parent),
                None => false,
            },
            InputEvent::Detach => self.detach(),
        }
    }

    /// Start a translate (body) or resize (handle) gesture.
    ///
    /// Ignored while another gesture is active or while detached.
    pub fn pointer_down(&mut self, target: PointerTarget, sample: PointerSample) -> bool {
        if self.gesture.is_some() {
            trace!(id = ?sample.id, "ignoring pointer down during active gesture");
            return false;
        }
        let Some(parent) = self.parent else {
            return false;
        };

        let kind = match target {
            PointerTarget::Body => GestureKind::Translate,
            PointerTarget::Handle(handle) => GestureKind::Resize(handle),
        };
        debug!(id = ?sample.id, ?kind, "gesture started");

        self.gesture = Some(PointerContext::begin(kind, &sample, &self.bbox, &parent));
        self.scope.install(GlobalListener::PointerMove);
        self.scope.install(GlobalListener::PointerUp);
        self.focus();
        true
    }

    /// Feed a move sample to the active gesture
    pub fn pointer_move(&mut self, sample: PointerSample) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        if !gesture.owns(&sample) {
            return false;
        }

        gesture.apply(&mut self.bbox, &parent, &sample);
        self.notify();
        true
    }

    /// End the active gesture if `sample` comes from the pointer that owns it
    pub fn pointer_up(&mut self, sample: PointerSample) -> bool {
        let owned = self.gesture.as_ref().is_some_and(|g| g.owns(&sample));
        if owned {
            self.end_gesture();
        }
        owned
    }

    fn end_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            debug!(id = ?gesture.id, kind = ?gesture.kind, "gesture ended");
        }
        self.scope.release(GlobalListener::PointerMove);
        self.scope.release(GlobalListener::PointerUp);
    }

    /// Give the selector keyboard focus, installing its key handling
    pub fn focus(&mut self) -> bool {
        if self.focused {
            return false;
        }
        self.focused = true;
        self.scope.install(GlobalListener::KeyDown);
        true
    }

    /// Drop keyboard focus; interrupts any gesture in progress
    pub fn blur(&mut self) -> bool {
        let was_active = self.focused || self.gesture.is_some();
        self.focused = false;
        self.scope.release(GlobalListener::KeyDown);
        self.end_gesture();
        was_active
    }

    /// The whole window lost focus
    pub fn window_blur(&mut self) -> bool {
        self.blur()
    }

    /// Handle an arrow key press while focused
    pub fn key_down(&mut self, press: &KeyPress) -> bool {
        if !self.scope.contains(GlobalListener::KeyDown) {
            return false;
        }
        let Some(parent) = self.parent else {
            return false;
        };

        let BoundingBox { x, y, width, height } = self.bbox;
        let avail_right = parent.width - (x + width);
        let avail_bottom = parent.height - (y + height);
        let step = press.modifiers.step();

        if press.modifiers.resizes() {
            match press.key {
                Key::ArrowUp => self.bbox.height = clamp(MIN_SIZE, height - step, height + avail_bottom),
                Key::ArrowDown => self.bbox.height = clamp(MIN_SIZE, height + step, height + avail_bottom),
                Key::ArrowLeft => self.bbox.width = clamp(MIN_SIZE, width - step, width + avail_right),
                Key::ArrowRight => self.bbox.width = clamp(MIN_SIZE, width + step, width + avail_right),
                Key::Other(_) => return false,
            }
        } else {
            match press.key {
                Key::ArrowUp => self.bbox.y = clamp(0.0, y - step, y + avail_bottom),
                Key::ArrowDown => self.bbox.y = clamp(0.0, y + step, y + avail_bottom),
                Key::ArrowLeft => self.bbox.x = clamp(0.0, x - step, x + avail_right),
                Key::ArrowRight => self.bbox.x = clamp(0.0, x + step, x + avail_right),
                Key::Other(_) => return false,
            }
        }

        self.notify();
        true
    }

    /// Attach to a parent, refitting the box into it
    pub fn attach(&mut self, parent: ParentBox) -> bool {
        self.parent = Some(parent);
        self.refit(parent);
        true
    }

    /// Detach from the parent; geometry operations become no-ops
    pub fn detach(&mut self) -> bool {
        let was_attached = self.parent.take().is_some();
        self.blur();
        was_attached
    }

    /// The observed parent changed size. Ignored while detached.
    pub fn observe_parent(&mut self, parent: ParentBox) -> bool {
        if self.parent.is_none() {
            return false;
        }
        self.parent = Some(parent);
        self.refit(parent)
    }

    fn refit(&mut self, parent: ParentBox) -> bool {
        let mut bbox = self.bbox;
        bbox.width = clamp(MIN_SIZE, bbox.width, parent.width);
        bbox.height = clamp(MIN_SIZE, bbox.height, parent.height);
        bbox.x = clamp(0.0, bbox.x, parent.width - bbox.width);
        bbox.y = clamp(0.0, bbox.y, parent.height - bbox.height);

        if bbox == self.bbox {
            return false;
        }
        debug!(from = %self.bbox, to = %bbox, "refitted selection into parent");
        self.bbox = bbox;
        self.notify();
        true
    }

    /// Reset to the default selection for the current parent
    pub fn reset(&mut self) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        self.end_gesture();
        self.bbox = parent.default_selection();
        self.notify();
        true
    }

    /// Move the left edge; rejected unless `0 <= x <= parent.width - width`
    pub fn set_x(&mut self, x: f64) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        if !x.is_finite() || x < 0.0 || x > parent.width - self.bbox.width {
            return false;
        }
        self.bbox.x = x;
        self.notify();
        true
    }

    /// Move the top edge; rejected unless `0 <= y <= parent.height - height`
    pub fn set_y(&mut self, y: f64) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        if !y.is_finite() || y < 0.0 || y > parent.height - self.bbox.height {
            return false;
        }
        self.bbox.y = y;
        self.notify();
        true
    }

    /// Change the width; rejected unless `MIN_SIZE <= width <= parent.width - x`
    pub fn set_width(&mut self, width: f64) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        if !width.is_finite() || width < MIN_SIZE || width > parent.width - self.bbox.x {
            return false;
        }
        self.bbox.width = width;
        self.notify();
        true
    }

    /// Change the height; rejected unless `MIN_SIZE <= height <= parent.height - y`
    pub fn set_height(&mut self, height: f64) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        if !height.is_finite() || height < MIN_SIZE || height > parent.height - self.bbox.y {
            return false;
        }
        self.bbox.height = height;
        self.notify();
        true
    }

    /// Cover the whole parent
    pub fn maximize(&mut self) -> bool {
        let Some(parent) = self.parent else {
            return false;
        };
        let moved_x = self.set_x(0.0);
        let moved_y = self.set_y(0.0);
        let sized_w = self.set_width(parent.width);
        let sized_h = self.set_height(parent.height);
        moved_x || moved_y || sized_w || sized_h
    }

    /// Shrink to the minimum size at the current origin
    pub fn minimize(&mut self) -> bool {
        let sized_w = self.set_width(MIN_SIZE);
        let sized_h = self.set_height(MIN_SIZE);
        sized_w || sized_h
    }

    /// Apply an explicit geometry through the setters: shrink, then move,
    /// then grow, so each step is checked against the box as it stands.
    /// Returns whether the selector ended up exactly at `target`.
    pub fn apply_geometry(&mut self, target: BoundingBox) -> bool {
        if target.width < self.bbox.width {
            self.set_width(target.width);
        }
        if target.height < self.bbox.height {
            self.set_height(target.height);
        }
        if target.x != self.bbox.x {
            self.set_x(target.x);
        }
        if target.y != self.bbox.y {
            self.set_y(target.y);
        }
        if target.width != self.bbox.width {
            self.set_width(target.width);
        }
        if target.height != self.bbox.height {
            self.set_height(target.height);
        }
        self.bbox == target
    }
}
