//! Per-gesture pointer tracking and scoped window listeners

use std::collections::BTreeSet;

use crate::domain::model::{clamp, BoundingBox, ParentBox};
use crate::selector::handle::{resize_edge, Edge, Handle};
use crate::selector::input::{PointerId, PointerSample};

/// Window-level listeners a selector may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalListener {
    PointerMove,
    PointerUp,
    KeyDown,
}

/// The set of window-level listeners currently installed by one selector.
///
/// Gestures and focus install listeners here and every exit path releases
/// them, so an observer can always check that nothing leaked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerScope {
    installed: BTreeSet<GlobalListener>,
}

impl ListenerScope {
    pub fn install(&mut self, listener: GlobalListener) {
        self.installed.insert(listener);
    }

    pub fn release(&mut self, listener: GlobalListener) {
        self.installed.remove(&listener);
    }

    pub fn contains(&self, listener: GlobalListener) -> bool {
        self.installed.contains(&listener)
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GlobalListener> + '_ {
        self.installed.iter().copied()
    }
}

/// What an active gesture does to the box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Translate,
    Resize(Handle),
}

/// State of one pointer gesture, from pointer-down to pointer-up
#[derive(Debug, Clone, PartialEq)]
pub struct PointerContext {
    pub id: PointerId,
    pub kind: GestureKind,
    start_page_x: f64,
    start_page_y: f64,
    prev_page_x: f64,
    prev_page_y: f64,
    start_left: f64,
    start_top: f64,
    /// Room between the box and the parent's right edge at gesture start
    start_right: f64,
    /// Room between the box and the parent's bottom edge at gesture start
    start_bottom: f64,
}

impl PointerContext {
    pub fn begin(
        kind: GestureKind,
        sample: &PointerSample,
        bbox: &BoundingBox,
        parent: &ParentBox,
    ) -> Self {
        Self {
            id: sample.id,
            kind,
            start_page_x: sample.page_x,
            start_page_y: sample.page_y,
            prev_page_x: sample.page_x,
            prev_page_y: sample.page_y,
            start_left: bbox.x,
            start_top: bbox.y,
            start_right: parent.width - bbox.right(),
            start_bottom: parent.height - bbox.bottom(),
        }
    }

    /// Whether `sample` belongs to this gesture
    pub fn owns(&self, sample: &PointerSample) -> bool {
        self.id == sample.id
    }

    /// Apply one move sample to `bbox`.
    ///
    /// Translation is measured from the gesture's starting point. Resizing is
    /// incremental: each edge consumes the movement since the previous sample
    /// on its own axis.
    pub fn apply(&mut self, bbox: &mut BoundingBox, parent: &ParentBox, sample: &PointerSample) {
        match self.kind {
            GestureKind::Translate => {
                let dx = sample.page_x - self.start_page_x;
                let dy = sample.page_y - self.start_page_y;
                // the parent may have shrunk since pointer-down
                let max_x = (self.start_left + self.start_right).min(parent.width - bbox.width);
                let max_y = (self.start_top + self.start_bottom).min(parent.height - bbox.height);
                bbox.x = clamp(0.0, self.start_left + dx, max_x);
                bbox.y = clamp(0.0, self.start_top + dy, max_y);
            }
            GestureKind::Resize(handle) => {
                for edge in handle.edges() {
                    let dx = sample.page_x - self.prev_page_x;
                    let dy = sample.page_y - self.prev_page_y;
                    resize_edge(bbox, parent, edge, dx, dy);
                    match edge {
                        Edge::Left | Edge::Right => self.prev_page_x = sample.page_x,
                        Edge::Top | Edge::Bottom => self.prev_page_y = sample.page_y,
                    }
                }
            }
        }
    }
}
