//! Picks the floor a world-space altitude belongs to.
//!
//! Resolution never fails for a finite altitude. Overlapping ranges and altitudes outside every
//! range still produce a floor, together with a [`FloorDiagnostic`] describing what went wrong.

use std::fmt;

use itertools::Itertools;
use thiserror::Error;
use tracing::warn;

use crate::error::{IResult, invalid_input};
use crate::record::{FloorDescriptor, MapRecord};
use crate::types::{ImageRef, Offset2D, ZRange};

/// Recoverable data-quality problems found while resolving a floor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FloorDiagnostic {
    #[error("Altitude {z} matches floors {matching:?}; using the first declared")]
    AmbiguousFloor { z: f32, matching: Vec<usize> },
    #[error("Altitude {z} is outside every floor; using nearest floor {nearest} ({distance} units away)")]
    OutOfRangeFloor {
        z: f32,
        nearest: usize,
        distance: f32,
    },
}

/// Which floor a position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloorIndex {
    /// The map declares no floors.
    Ground,
    /// Index into [`MapRecord::floors`].
    Declared(usize),
}

impl fmt::Display for FloorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorIndex::Ground => f.write_str("ground"),
            FloorIndex::Declared(idx) => write!(f, "floor {idx}"),
        }
    }
}

/// A floor selected for projection. Borrowed from the record it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFloor<'a> {
    pub index: FloorIndex,
    /// Offset relative to the record's base offset.
    pub offset: Offset2D,
    pub z_range: Option<ZRange>,
    pub overlay: &'a ImageRef,
}

impl<'a> ResolvedFloor<'a> {
    /// The synthetic floor used for maps without declared floors.
    pub fn ground(record: &'a MapRecord) -> Self {
        Self {
            index: FloorIndex::Ground,
            offset: Offset2D::ZERO,
            z_range: None,
            overlay: record.overlay_radar(),
        }
    }

    fn declared(index: usize, floor: &'a FloorDescriptor) -> Self {
        Self {
            index: FloorIndex::Declared(index),
            offset: floor.offset(),
            z_range: Some(floor.z_range()),
            overlay: floor.overlay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorResolution<'a> {
    pub floor: ResolvedFloor<'a>,
    pub diagnostic: Option<FloorDiagnostic>,
}

/// Select the floor of `record` whose z range contains `z`.
///
/// - no declared floors: the ground floor, `z` is not inspected
/// - one match: that floor
/// - several matches: the first declared, with [`FloorDiagnostic::AmbiguousFloor`]
/// - no match: the floor with the nearest bound (earliest on ties), with
///   [`FloorDiagnostic::OutOfRangeFloor`]
///
/// Only a non-finite `z` on a map with floors is an error.
pub fn resolve_floor(record: &MapRecord, z: f32) -> IResult<FloorResolution<'_>> {
    let floors = record.floors();
    if floors.is_empty() {
        return Ok(FloorResolution {
            floor: ResolvedFloor::ground(record),
            diagnostic: None,
        });
    }

    if !z.is_finite() {
        return Err(invalid_input(format!(
            "altitude {z} is not finite (map {})",
            record.map_id()
        )));
    }

    let matching: Vec<usize> = floors
        .iter()
        .positions(|floor| floor.z_range().contains(z))
        .collect();

    let (index, diagnostic) = match (matching.first().copied(), matching.len()) {
        (Some(only), 1) => (only, None),
        (Some(first), _) => {
            warn!(
                map = %record.map_id(),
                z,
                floors = ?matching,
                "overlapping floor ranges, using first declared floor"
            );
            (first, Some(FloorDiagnostic::AmbiguousFloor { z, matching }))
        }
        (None, _) => {
            // `floors` is non-empty, so a minimum always exists.
            let nearest = floors
                .iter()
                .map(|floor| floor.z_range().distance_to(z))
                .position_min_by(|a, b| a.total_cmp(b))
                .unwrap_or(0);
            let distance = floors[nearest].z_range().distance_to(z);
            warn!(
                map = %record.map_id(),
                z,
                nearest,
                distance,
                "altitude outside every floor range, using nearest floor"
            );
            (
                nearest,
                Some(FloorDiagnostic::OutOfRangeFloor {
                    z,
                    nearest,
                    distance,
                }),
            )
        }
    };

    Ok(FloorResolution {
        floor: ResolvedFloor::declared(index, &floors[index]),
        diagnostic,
    })
}
