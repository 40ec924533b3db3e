//! Core types for the layout solver

use crate::document::Attribute;

/// A resolved length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute length in surface units
    Px(f64),
    /// Percentage of the parent container's matching dimension
    Percent(f64),
}

impl Length {
    /// Resolve against the parent dimension this length is relative to
    pub fn resolve(self, parent_extent: f64) -> f64 {
        match self {
            Length::Px(v) => v,
            Length::Percent(p) => parent_extent * p / 100.0,
        }
    }
}

/// Axes on which a node is shifted back by half its own size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CenterTransform {
    pub x: bool,
    pub y: bool,
}

/// Vertical alignment annotation from a baseline constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineAlignment {
    First,
    Last,
    Baseline,
}

impl BaselineAlignment {
    pub fn from_attribute(attribute: Attribute) -> Option<Self> {
        match attribute {
            Attribute::FirstBaseline => Some(Self::First),
            Attribute::LastBaseline => Some(Self::Last),
            Attribute::Baseline => Some(Self::Baseline),
            _ => None,
        }
    }
}

/// Solver output for one node in one pass.
///
/// Edge offsets are relative to the parent container: `left`/`top` from its
/// origin, `right`/`bottom` from its far edges. `None` means unconstrained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutBox {
    pub left: Option<Length>,
    pub top: Option<Length>,
    pub right: Option<Length>,
    pub bottom: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub center: CenterTransform,
    pub baseline: Option<BaselineAlignment>,
}

impl LayoutBox {
    /// Whether any edge offset was set
    pub fn has_position(&self) -> bool {
        self.left.is_some() || self.top.is_some() || self.right.is_some() || self.bottom.is_some()
    }

    /// Absolute rectangle of this box inside `parent` (absolute coordinates).
    ///
    /// Missing sizes fall back to `fallback_size`, min/max limits are applied,
    /// and the centering transform shifts back by half the resolved size.
    pub fn to_absolute(&self, parent: &Rect, fallback_size: (f64, f64)) -> Rect {
        let width = resolve_extent(
            self.width,
            self.left,
            self.right,
            parent.width,
            fallback_size.0,
            self.min_width,
            self.max_width,
        );
        let height = resolve_extent(
            self.height,
            self.top,
            self.bottom,
            parent.height,
            fallback_size.1,
            self.min_height,
            self.max_height,
        );
        let x = resolve_origin(self.left, self.right, parent.x, parent.width, width, self.center.x);
        let y = resolve_origin(self.top, self.bottom, parent.y, parent.height, height, self.center.y);
        Rect::new(x, y, width, height)
    }
}

fn resolve_extent(
    size: Option<Length>,
    start: Option<Length>,
    end: Option<Length>,
    parent_extent: f64,
    fallback: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> f64 {
    let value = match (size, start, end) {
        (Some(size), _, _) => size.resolve(parent_extent),
        (None, Some(start), Some(end)) => {
            parent_extent - start.resolve(parent_extent) - end.resolve(parent_extent)
        }
        _ => fallback,
    };
    clamp_extent(value, min, max)
}

/// Apply min then max limits; a max below the min wins
pub(crate) fn clamp_extent(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = min.map_or(value, |m| value.max(m));
    max.map_or(value, |m| value.min(m)).max(0.0)
}

fn resolve_origin(
    start: Option<Length>,
    end: Option<Length>,
    parent_origin: f64,
    parent_extent: f64,
    extent: f64,
    centered: bool,
) -> f64 {
    let origin = match (start, end) {
        (Some(start), _) => parent_origin + start.resolve(parent_extent),
        (None, Some(end)) => parent_origin + parent_extent - end.resolve(parent_extent) - extent,
        (None, None) => parent_origin,
    };
    if centered {
        origin - extent / 2.0
    } else {
        origin
    }
}

/// An absolute, surface-relative rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized rectangle at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Translate by another rectangle's origin
    pub fn offset_by(&self, origin: &Rect) -> Rect {
        Rect::new(self.x + origin.x, self.y + origin.y, self.width, self.height)
    }

    /// The absolute coordinate or extent an attribute denotes on this rectangle.
    ///
    /// Baselines have no text metrics here and read as the bottom edge.
    pub fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Width => self.width,
            Attribute::Height => self.height,
            Attribute::Left | Attribute::Leading => self.x,
            Attribute::Right | Attribute::Trailing => self.right(),
            Attribute::Top => self.y,
            Attribute::Bottom
            | Attribute::FirstBaseline
            | Attribute::LastBaseline
            | Attribute::Baseline => self.bottom(),
            Attribute::CenterX | Attribute::Center => self.center_x(),
            Attribute::CenterY => self.center_y(),
            Attribute::AspectRatio => {
                if self.height == 0.0 {
                    0.0
                } else {
                    self.width / self.height
                }
            }
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::zero()
    }
}
