/// Axis-aligned rectangle in logical screen pixels.
/// `y` grows downward, so `top()` is the smallest y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// True if the rectangles intersect. Touching edges count as an overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    !(a.right() < b.left()
        || b.right() < a.left()
        || a.bottom() < b.top()
        || b.bottom() < a.top())
}
