//! Absolute screen-space points and rectangles.
//!
//! Every coordinate handed out by the matcher is absolute: on a multi-display
//! desktop, x and y may be negative for displays left of or above the primary
//! one, so positions are signed while sizes are not.

use std::fmt;

/// A point in absolute screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns a new location shifted by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle in absolute screen coordinates.
///
/// A rectangle is not tied to any display; the capture layer decides which
/// display (if any) covers it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its top-left corner and a `(width, height)` size.
    pub fn from_location(origin: Location, size: (u32, u32)) -> Self {
        Self::new(origin.x, origin.y, size.0, size.1)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// Returns `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn top_left(&self) -> Location {
        Location::new(self.x, self.y)
    }

    /// Exclusive bottom-right corner.
    pub fn bottom_right(&self) -> Location {
        Location::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> Location {
        Location::new(
            self.x.saturating_add((self.width / 2) as i32),
            self.y.saturating_add((self.height / 2) as i32),
        )
    }

    /// Checks that both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn contains(&self, point: Location) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Checks that `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the overlapping area, or `None` when the rectangles are disjoint.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rectangle::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Location, Rectangle};

    #[test]
    fn contains_uses_exclusive_far_edges() {
        let rect = Rectangle::new(-100, 0, 100, 50);
        assert!(rect.contains(Location::new(-100, 0)));
        assert!(rect.contains(Location::new(-1, 49)));
        assert!(!rect.contains(Location::new(0, 0)));
        assert!(!rect.contains(Location::new(-50, 50)));
    }

    #[test]
    fn intersection_of_adjacent_displays_is_empty() {
        let left = Rectangle::new(-1920, 0, 1920, 1080);
        let right = Rectangle::new(0, 0, 2560, 1440);
        assert_eq!(left.intersection(&right), None);

        let search = Rectangle::new(-10, 10, 20, 20);
        assert_eq!(
            left.intersection(&search),
            Some(Rectangle::new(-10, 10, 10, 20))
        );
        assert!(!right.contains_rect(&search));
        assert!(right.contains_rect(&Rectangle::new(0, 10, 10, 20)));
    }

    #[test]
    fn setters_only_touch_their_field() {
        let mut rect = Rectangle::new(1, 2, 3, 4);
        rect.set_width(30);
        rect.set_y(-2);
        assert_eq!(rect, Rectangle::new(1, -2, 30, 4));
        assert_eq!(rect.center(), Location::new(16, 0));
        assert_eq!(rect.bottom_right(), Location::new(31, 2));
    }
}
