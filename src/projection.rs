//! World-space to overlay pixel projection.
//!
//! ```text
//! effective = base_offset + floor.offset
//! pixel.x   = (world.x + effective.x) / resolution
//! pixel.y   = (world.y + effective.y) / resolution
//! ```
//!
//! Pixel Y grows in the same direction as world Y; overlay images are authored in that
//! orientation. Surfaces with a bottom-left origin should apply [`PixelPos::flipped_y`].
//! Results are not clamped to the image.

use crate::error::{IResult, invalid_input};
use crate::floor::{FloorDiagnostic, FloorIndex, ResolvedFloor, resolve_floor};
use crate::record::MapRecord;
use crate::registry::MapRegistry;
use crate::types::{ImageRef, MapId, PixelPos, WorldPos};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection<'a> {
    pub pixel: PixelPos,
    pub overlay: &'a ImageRef,
}

/// Project `(world_x, world_y)` onto the overlay of `floor`.
pub fn project<'a>(
    record: &MapRecord,
    floor: &ResolvedFloor<'a>,
    world_x: f32,
    world_y: f32,
) -> IResult<Projection<'a>> {
    if !world_x.is_finite() || !world_y.is_finite() {
        return Err(invalid_input(format!(
            "world position ({world_x}, {world_y}) is not finite"
        )));
    }

    let effective = record.base_offset() + floor.offset;
    let resolution = record.resolution();
    let pixel = PixelPos {
        x: (world_x + effective.x) / resolution,
        y: (world_y + effective.y) / resolution,
    };

    // Finite inputs can still overflow f32.
    if !pixel.x.is_finite() || !pixel.y.is_finite() {
        return Err(invalid_input(format!(
            "world position ({world_x}, {world_y}) overflows on map {}",
            record.map_id()
        )));
    }

    Ok(Projection {
        pixel,
        overlay: floor.overlay,
    })
}

/// Where an entity should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub record: &'a MapRecord,
    pub pixel: PixelPos,
    pub overlay: &'a ImageRef,
    pub floor: FloorIndex,
    pub diagnostic: Option<FloorDiagnostic>,
}

impl<'a> Placement<'a> {
    pub fn map_id(&self) -> &'a MapId {
        self.record.map_id()
    }

    /// Layers to draw under the entity, bottom first: the floor's overlay followed by the map's
    /// auxiliary overlays.
    pub fn overlay_layers(&self) -> impl Iterator<Item = (&'a str, &'a ImageRef)> + use<'a> {
        std::iter::once(("radar", self.overlay)).chain(self.record.aux_overlays())
    }
}

/// Look up `map_id`, resolve the floor for `pos.z` and project `pos` onto it.
///
/// Fails with `UnknownMap` for unregistered maps and `InvalidInput` for non-finite coordinates.
/// Floor data-quality problems are reported through [`Placement::diagnostic`].
pub fn locate<'a>(
    registry: &'a MapRegistry,
    map_id: &str,
    pos: WorldPos,
) -> IResult<Placement<'a>> {
    let record = registry.lookup(map_id)?;
    let resolution = resolve_floor(record, pos.z)?;
    let projection = project(record, &resolution.floor, pos.x, pos.y)?;

    Ok(Placement {
        record,
        pixel: projection.pixel,
        overlay: projection.overlay,
        floor: resolution.floor.index,
        diagnostic: resolution.diagnostic,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::record::{RawFloor, RawMapRecord};
    use crate::types::{Offset2D, ZRange};

    const EPSILON: f32 = 1e-2;

    fn assert_pixel(actual: PixelPos, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < EPSILON && (actual.y - y).abs() < EPSILON,
            "expected ({x}, {y}), got {actual}"
        );
    }

    fn flat_map() -> MapRecord {
        MapRecord::new(
            RawMapRecord::builder()
                .map_id("de_flat")
                .resolution(4.96)
                .base_offset(Offset2D::new(3890.0, 3800.0))
                .overlay_radar("de_flat/radar.png")
                .overlay_buyzones("de_flat/overlay_buyzones.png")
                .build(),
        )
        .unwrap()
    }

    fn tower_map() -> MapRecord {
        MapRecord::new(
            RawMapRecord::builder()
                .map_id("de_tower")
                .resolution(4.96)
                .base_offset(Offset2D::new(3890.0, 3800.0))
                .floors(vec![
                    RawFloor::builder()
                        .offset(Offset2D::new(0.2, -42.6))
                        .z_range(ZRange::new(11485.0, 11680.0))
                        .build(),
                    RawFloor::builder()
                        .offset(Offset2D::new(10.0, 10.0))
                        .z_range(ZRange::new(11700.0, 12000.0))
                        .overlay("de_tower/upper.png")
                        .build(),
                ])
                .overlay_radar("de_tower/radar.png")
                .build(),
        )
        .unwrap()
    }

    fn registry() -> MapRegistry {
        MapRegistry::from_records([flat_map(), tower_map()]).unwrap()
    }

    #[test]
    fn floorless_projection_ignores_altitude() {
        let registry = registry();
        for z in [0.0, 11500.0, -350.0] {
            let placement = locate(&registry, "de_flat", WorldPos::new(0.0, 0.0, z)).unwrap();
            assert_pixel(placement.pixel, 784.27, 766.13);
            assert_eq!(placement.floor, FloorIndex::Ground);
            assert_eq!(placement.overlay.as_str(), "de_flat/radar.png");
            assert!(placement.diagnostic.is_none());
        }
    }

    #[test]
    fn floor_offset_is_relative_to_base() {
        let registry = registry();
        let placement =
            locate(&registry, "de_tower", WorldPos::new(0.0, 0.0, 11500.0)).unwrap();
        assert_pixel(placement.pixel, 3890.2 / 4.96, 3757.4 / 4.96);
        assert_eq!(placement.floor, FloorIndex::Declared(0));
        assert_eq!(placement.overlay.as_str(), "de_tower/radar.png");

        let placement =
            locate(&registry, "de_tower", WorldPos::new(-100.0, 50.0, 11800.0)).unwrap();
        assert_pixel(placement.pixel, 3800.0 / 4.96, 3860.0 / 4.96);
        assert_eq!(placement.floor, FloorIndex::Declared(1));
        assert_eq!(placement.overlay.as_str(), "de_tower/upper.png");
    }

    #[test]
    fn out_of_range_still_projects() {
        let registry = registry();
        let placement = locate(&registry, "de_tower", WorldPos::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(placement.floor, FloorIndex::Declared(0));
        assert!(matches!(
            placement.diagnostic,
            Some(FloorDiagnostic::OutOfRangeFloor { .. })
        ));
        assert_pixel(placement.pixel, 3890.2 / 4.96, 3757.4 / 4.96);
    }

    #[test]
    fn pixels_are_not_clamped() {
        let record = flat_map();
        let floor = ResolvedFloor::ground(&record);
        let projection = project(&record, &floor, -10000.0, 50000.0).unwrap();
        assert!(projection.pixel.x < 0.0);
        assert!(projection.pixel.y > 10000.0);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let registry = registry();
        let cases = [
            WorldPos::new(f32::NAN, 0.0, 0.0),
            WorldPos::new(0.0, f32::INFINITY, 0.0),
            WorldPos::new(0.0, 0.0, f32::NEG_INFINITY),
        ];
        for pos in cases {
            let err = locate(&registry, "de_tower", pos).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::InvalidInput { .. }), "{pos:?}");
        }

        let record = flat_map();
        let floor = ResolvedFloor::ground(&record);
        let err = project(&record, &floor, f32::NAN, 0.0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidInput { .. }));
    }

    #[test]
    fn overflow_is_rejected() {
        let record = MapRecord::new(
            RawMapRecord::builder()
                .map_id("de_tiny")
                .resolution(1e-30)
                .overlay_radar("radar.png")
                .build(),
        )
        .unwrap();
        let floor = ResolvedFloor::ground(&record);
        let err = project(&record, &floor, f32::MAX, 0.0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidInput { .. }));
    }

    #[test]
    fn unknown_map_is_not_defaulted() {
        let registry = registry();
        let err = locate(&registry, "nonexistent", WorldPos::default()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownMap(_)));
    }

    #[test]
    fn projection_is_pure() {
        let registry = registry();
        let pos = WorldPos::new(123.5, -987.25, 11600.0);
        let first = locate(&registry, "de_tower", pos).unwrap();
        for _ in 0..16 {
            assert_eq!(locate(&registry, "de_tower", pos).unwrap(), first);
        }
    }

    #[test]
    fn overlay_layers_order() {
        let registry = registry();
        let placement = locate(&registry, "de_flat", WorldPos::default()).unwrap();
        let layers: Vec<(&str, &str)> = placement
            .overlay_layers()
            .map(|(name, overlay)| (name, overlay.as_str()))
            .collect();
        assert_eq!(
            layers,
            vec![
                ("radar", "de_flat/radar.png"),
                ("buyzones", "de_flat/overlay_buyzones.png"),
            ]
        );
        assert_eq!(placement.map_id().as_str(), "de_flat");
    }
}
