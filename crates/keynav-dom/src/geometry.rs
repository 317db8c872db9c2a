//! Geometry
//!
//! Bounding rectangles as reported by the host tree. The navigator only reads
//! the top-left corner for bookkeeping; no layout happens here.

/// Bounding client rectangle of an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }
}

impl From<[f64; 4]> for DomRect {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::from_xywh(x, y, width, height)
    }
}
