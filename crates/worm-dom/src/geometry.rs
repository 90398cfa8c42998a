//! Geometry APIs
//!
//! DOMRect plus the small set of rect operations the anchoring code needs.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    /// Centre point
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Zero width or height
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if point is inside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Whether `other` lies fully inside this rect (edges inclusive)
    pub fn contains_rect(&self, other: &DOMRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if rects intersect
    pub fn intersects(&self, other: &DOMRect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Smallest rect covering both
    pub fn union(&self, other: &DOMRect) -> DOMRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        DOMRect::from_xywh(x, y, right - x, bottom - y)
    }

    /// Same rect moved by `(dx, dy)`
    pub fn translate(&self, dx: f64, dy: f64) -> DOMRect {
        DOMRect::from_xywh(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Size comparison with a tolerance
    pub fn same_size(&self, other: &DOMRect) -> bool {
        (self.width - other.width).abs() <= 0.01 && (self.height - other.height).abs() <= 0.01
    }
}

/// Union of a list of rects, `None` when empty
pub fn bounding_rect<I: IntoIterator<Item = DOMRect>>(rects: I) -> Option<DOMRect> {
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}
