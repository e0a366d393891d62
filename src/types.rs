//! Coordinate and identity types shared by the registry, floor resolver and projector.
//!
//! World coordinates are in the level's native units. Pixel coordinates are relative to the
//! top-left corner of the overlay image selected for the position's floor.

use std::fmt;

// =============================================================================
// Identity Types
// =============================================================================

/// Internal map name used as the registry key (e.g. `de_vertigo`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MapId(String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        MapId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(v: &str) -> Self {
        MapId(v.to_string())
    }
}

impl From<String> for MapId {
    fn from(v: String) -> Self {
        MapId(v)
    }
}

impl std::borrow::Borrow<str> for MapId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to a raster asset. Never opened or decoded here; the asset loader owns that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        ImageRef(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(v: &str) -> Self {
        ImageRef(v.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(v: String) -> Self {
        ImageRef(v)
    }
}

// =============================================================================
// Position Types
// =============================================================================

/// Planar offset in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset2D {
    pub x: f32,
    pub y: f32,
}

impl Offset2D {
    pub const ZERO: Offset2D = Offset2D { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Offset2D {
    type Output = Offset2D;
    fn add(self, rhs: Offset2D) -> Offset2D {
        Offset2D {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// Inclusive vertical bounds of a floor, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZRange {
    pub min: f32,
    pub max: f32,
}

impl ZRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `min <= z <= max`.
    pub fn contains(&self, z: f32) -> bool {
        self.min <= z && z <= self.max
    }

    /// Distance from `z` to the closest bound, or `0.0` when `z` lies inside the range.
    pub fn distance_to(&self, z: f32) -> f32 {
        if z < self.min {
            self.min - z
        } else if z > self.max {
            z - self.max
        } else {
            0.0
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl fmt::Display for ZRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// A position reported by the position feed.
/// X/Y span the horizontal plane, Z is altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Position on an overlay image. Not clamped; values outside the image are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    /// Mirror the Y axis for surfaces whose origin is the bottom-left corner.
    pub fn flipped_y(self, image_height: f32) -> PixelPos {
        PixelPos {
            x: self.x,
            y: image_height - self.y,
        }
    }
}

impl fmt::Display for PixelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
