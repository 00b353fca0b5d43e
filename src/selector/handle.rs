//! Resize handles and the edge arithmetic behind them

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::model::{clamp, BoundingBox, ParentBox, MIN_SIZE};

/// One side of the selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Vertical half of a corner handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertical {
    Top,
    Bottom,
}

/// Horizontal half of a corner handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizontal {
    Left,
    Right,
}

/// One of the eight resize hotspots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Edge(Edge),
    Corner(Vertical, Horizontal),
}

impl From<Vertical> for Edge {
    fn from(v: Vertical) -> Self {
        match v {
            Vertical::Top => Edge::Top,
            Vertical::Bottom => Edge::Bottom,
        }
    }
}

impl From<Horizontal> for Edge {
    fn from(h: Horizontal) -> Self {
        match h {
            Horizontal::Left => Edge::Left,
            Horizontal::Right => Edge::Right,
        }
    }
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::Edge(Edge::Right),
        Handle::Edge(Edge::Left),
        Handle::Edge(Edge::Bottom),
        Handle::Edge(Edge::Top),
        Handle::Corner(Vertical::Top, Horizontal::Left),
        Handle::Corner(Vertical::Top, Horizontal::Right),
        Handle::Corner(Vertical::Bottom, Horizontal::Left),
        Handle::Corner(Vertical::Bottom, Horizontal::Right),
    ];

    /// Edges driven by this handle, vertical edge first for corners
    pub fn edges(self) -> Vec<Edge> {
        match self {
            Handle::Edge(edge) => vec![edge],
            Handle::Corner(v, h) => vec![v.into(), h.into()],
        }
    }

    /// Stable identifier, e.g. `right` or `bottom-left`
    pub fn id(self) -> &'static str {
        match self {
            Handle::Edge(Edge::Top) => "top",
            Handle::Edge(Edge::Bottom) => "bottom",
            Handle::Edge(Edge::Left) => "left",
            Handle::Edge(Edge::Right) => "right",
            Handle::Corner(Vertical::Top, Horizontal::Left) => "top-left",
            Handle::Corner(Vertical::Top, Horizontal::Right) => "top-right",
            Handle::Corner(Vertical::Bottom, Horizontal::Left) => "bottom-left",
            Handle::Corner(Vertical::Bottom, Horizontal::Right) => "bottom-right",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Handle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::ALL
            .into_iter()
            .find(|handle| handle.id() == s)
            .ok_or_else(|| DomainError::BadArgs(format!("Unknown resize handle '{}'", s)))
    }
}

/// Move one edge of `bbox` by a pointer movement, keeping the box inside
/// `parent` and no smaller than [`MIN_SIZE`] on either axis.
pub fn resize_edge(bbox: &mut BoundingBox, parent: &ParentBox, edge: Edge, dx: f64, dy: f64) {
    match edge {
        Edge::Right => {
            let right = parent.width - bbox.right();
            bbox.width = clamp(MIN_SIZE, bbox.width + dx, bbox.width + right);
        }
        Edge::Left => {
            let shift = clamp(-bbox.x, dx, bbox.width - MIN_SIZE);
            bbox.width -= shift;
            bbox.x += shift;
        }
        Edge::Bottom => {
            let bottom = parent.height - bbox.bottom();
            bbox.height = clamp(MIN_SIZE, bbox.height + dy, bbox.height + bottom);
        }
        Edge::Top => {
            let shift = clamp(-bbox.y, dy, bbox.height - MIN_SIZE);
            bbox.height -= shift;
            bbox.y += shift;
        }
    }
}
