//! Tile-Unit Geometry
//!
//! Integer rectangle and direction primitives for the simulation.
//! All coordinates are engine units (`UNIT_SIZE` engine units per map
//! grid unit); integer arithmetic keeps every operation deterministic.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Engine distance/coordinate type.
pub type Unit = i32;

/// Engine units per map grid unit. Also the bordering tolerance: two
/// edges closer than one unit apart are considered in contact.
pub const UNIT_SIZE: Unit = 4;

/// A cardinal side of a rectangle.
///
/// The numeric encoding (Top=0 .. Left=3) doubles as the index into a
/// Thing's `bordering` array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Facing up / the top edge
    Top = 0,
    /// Facing right / the right edge
    Right = 1,
    /// Facing down / the bottom edge
    Bottom = 2,
    /// Facing left / the left edge
    Left = 3,
}

impl Direction {
    /// All four directions in bordering-resolution priority order.
    ///
    /// Top before Right before Bottom before Left is a deliberate
    /// corner tie-break and must not be reordered.
    pub const IN_PRIORITY_ORDER: [Direction; 4] =
        [Direction::Top, Direction::Right, Direction::Bottom, Direction::Left];

    /// The side facing this one.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// True for Top/Bottom.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }

    /// Index into a 4-element per-direction array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase side name, matching map-authoring data.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Right => "right",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
        }
    }

    /// Decode the 0-3 encoding.
    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::Top),
            1 => Some(Direction::Right),
            2 => Some(Direction::Bottom),
            3 => Some(Direction::Left),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned rectangle in engine units.
///
/// `top < bottom` and `left < right` for any placed Thing; the y axis
/// grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Top edge
    pub top: Unit,
    /// Right edge
    pub right: Unit,
    /// Bottom edge
    pub bottom: Unit,
    /// Left edge
    pub left: Unit,
}

impl Bounds {
    /// Create from edge positions.
    #[inline]
    pub const fn new(top: Unit, right: Unit, bottom: Unit, left: Unit) -> Self {
        Self { top, right, bottom, left }
    }

    /// Create from a top-left corner and a size.
    #[inline]
    pub const fn from_position(left: Unit, top: Unit, width: Unit, height: Unit) -> Self {
        Self {
            top,
            right: left + width,
            bottom: top + height,
            left,
        }
    }

    /// Width of the rectangle.
    #[inline]
    pub fn width(&self) -> Unit {
        self.right - self.left
    }

    /// Height of the rectangle.
    #[inline]
    pub fn height(&self) -> Unit {
        self.bottom - self.top
    }

    /// Horizontal midpoint.
    #[inline]
    pub fn mid_x(&self) -> Unit {
        self.left + self.width() / 2
    }

    /// Vertical midpoint.
    #[inline]
    pub fn mid_y(&self) -> Unit {
        self.top + self.height() / 2
    }

    /// Move the top edge to `top`, preserving size.
    #[inline]
    pub fn set_top(&mut self, top: Unit) {
        let height = self.height();
        self.top = top;
        self.bottom = top + height;
    }

    /// Move the right edge to `right`, preserving size.
    #[inline]
    pub fn set_right(&mut self, right: Unit) {
        let width = self.width();
        self.right = right;
        self.left = right - width;
    }

    /// Move the bottom edge to `bottom`, preserving size.
    #[inline]
    pub fn set_bottom(&mut self, bottom: Unit) {
        let height = self.height();
        self.bottom = bottom;
        self.top = bottom - height;
    }

    /// Move the left edge to `left`, preserving size.
    #[inline]
    pub fn set_left(&mut self, left: Unit) {
        let width = self.width();
        self.left = left;
        self.right = left + width;
    }

    /// Get one edge by direction.
    #[inline]
    pub fn edge(&self, direction: Direction) -> Unit {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Snap one edge flush to `position`, preserving size.
    #[inline]
    pub fn snap_edge(&mut self, direction: Direction, position: Unit) {
        match direction {
            Direction::Top => self.set_top(position),
            Direction::Right => self.set_right(position),
            Direction::Bottom => self.set_bottom(position),
            Direction::Left => self.set_left(position),
        }
    }

    /// Displace by `(dx, dy)`.
    #[inline]
    pub fn shift(&mut self, dx: Unit, dy: Unit) {
        self.top += dy;
        self.bottom += dy;
        self.left += dx;
        self.right += dx;
    }

    /// Rectangle intersection test, edge-touching included.
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }

    /// Grow to the union of the two rectangles.
    pub fn stretch_to(&mut self, other: &Bounds) {
        self.top = self.top.min(other.top);
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.max(other.bottom);
        self.right = self.right.max(other.right);
    }
}
