pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type SideOffsets = euclid::SideOffsets2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width.max(0.0), height.max(0.0))
}

pub fn offsets(edges: &prochart_core::layout::Edges) -> SideOffsets {
    SideOffsets::new(edges.top, edges.right, edges.bottom, edges.left)
}

/// Shrinks `r` by `by`, never below zero size.
pub fn inset(r: &Rect, by: &SideOffsets) -> Rect {
    rect(
        r.origin.x + by.left,
        r.origin.y + by.top,
        r.size.width - by.left - by.right,
        r.size.height - by.top - by.bottom,
    )
}

/// Point at `radius` along `angle` (radians, 0 = 3 o'clock, clockwise with y down).
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    point(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}
