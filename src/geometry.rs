//! Integer screen geometry.
//!
//! Edge arithmetic saturates at the `i32` range instead of wrapping, so
//! rectangles far off-screen still intersect and clip correctly.

/// Window coordinates and extents are kept within this magnitude so
/// decoration arithmetic never leaves the `i32` range.
pub const COORD_LIMIT: i32 = 1 << 24;

/// A point in screen or client space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. `x`/`y` may be negative (partially off-screen),
/// the extent never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        saturate(self.x as i64 + self.w as i64)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        saturate(self.y as i64 + self.h as i64)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, span(x0, x1), span(y0, y1)))
        } else {
            None
        }
    }

    /// Smallest rectangle covering both. Empty operands are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, span(x0, x1), span(y0, y1))
    }

    /// Shrink by the given insets, saturating at zero extent.
    pub fn inset(&self, left: u32, top: u32, right: u32, bottom: u32) -> Rect {
        Rect::new(
            self.x.saturating_add_unsigned(left),
            self.y.saturating_add_unsigned(top),
            self.w.saturating_sub(left.saturating_add(right)),
            self.h.saturating_sub(top.saturating_add(bottom)),
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.w,
            self.h,
        )
    }

    /// Origin pulled into `±COORD_LIMIT`, extent capped at `COORD_LIMIT`.
    pub fn clamped(&self) -> Rect {
        let limit = COORD_LIMIT as u32;
        Rect::new(
            self.x.clamp(-COORD_LIMIT, COORD_LIMIT),
            self.y.clamp(-COORD_LIMIT, COORD_LIMIT),
            self.w.min(limit),
            self.h.min(limit),
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Distance from `a` to `b`, `a <= b`.
fn span(a: i32, b: i32) -> u32 {
    (b as i64 - a as i64) as u32
}
