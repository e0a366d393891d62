//! Per-map radar metadata.
//!
//! [`RawMapRecord`] is what configuration hands us. [`MapRecord`] is the validated form; the only
//! way to obtain one is [`MapRecord::new`] (or its `TryFrom` equivalent), so every record held by a
//! registry already satisfies its invariants.

use bon::Builder;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{IResult, invalid_record};
use crate::types::{ImageRef, MapId, Offset2D, ZRange};

/// Layer names taken by the radar and buy zone overlays.
const RESERVED_LAYER_NAMES: [&str; 2] = ["radar", "buyzones"];

/// Unvalidated floor entry as it appears in configuration.
#[derive(Builder, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawFloor {
    /// Offset relative to the record's base offset. Omitted means no shift.
    #[cfg_attr(feature = "serde", serde(default))]
    offset: Option<Offset2D>,
    z_range: ZRange,
    /// Overlay for this floor. Omitted means the record's primary radar image.
    #[builder(into)]
    #[cfg_attr(feature = "serde", serde(default))]
    overlay: Option<ImageRef>,
}

/// Unvalidated map record as supplied by a configuration loader.
#[derive(Builder, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawMapRecord {
    #[builder(into)]
    map_id: String,
    #[builder(into, default)]
    #[cfg_attr(feature = "serde", serde(default))]
    display_name: String,
    resolution: f32,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    base_offset: Offset2D,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    floors: Vec<RawFloor>,
    #[builder(into)]
    #[cfg_attr(feature = "serde", serde(default))]
    overlay_radar: Option<ImageRef>,
    #[builder(into)]
    #[cfg_attr(feature = "serde", serde(default))]
    overlay_buyzones: Option<ImageRef>,
    /// Additional named overlay layers, drawn in declaration order.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    aux_overlays: Vec<(String, ImageRef)>,
}

/// One horizontal slice of a map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FloorDescriptor {
    offset: Offset2D,
    z_range: ZRange,
    overlay: ImageRef,
}

impl FloorDescriptor {
    /// Offset relative to the owning record's base offset.
    pub fn offset(&self) -> Offset2D {
        self.offset
    }

    pub fn z_range(&self) -> ZRange {
        self.z_range
    }

    pub fn overlay(&self) -> &ImageRef {
        &self.overlay
    }
}

/// Validated projection parameters for one map.
///
/// Invariants:
/// - `map_id` is non-empty
/// - `resolution` is finite and `> 0`
/// - every offset is finite, every floor's z range has finite bounds with `min <= max`
/// - every overlay reference is non-empty
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawMapRecord", into = "RawMapRecord")
)]
pub struct MapRecord {
    map_id: MapId,
    display_name: String,
    resolution: f32,
    base_offset: Offset2D,
    floors: Vec<FloorDescriptor>,
    overlay_radar: ImageRef,
    overlay_buyzones: Option<ImageRef>,
    aux_overlays: IndexMap<String, ImageRef>,
}

impl MapRecord {
    /// Validate `raw` and build the record. Fails with
    /// [`ErrorKind::InvalidRecord`](crate::error::ErrorKind::InvalidRecord) on the first
    /// violated invariant.
    pub fn new(raw: RawMapRecord) -> IResult<MapRecord> {
        let RawMapRecord {
            map_id,
            display_name,
            resolution,
            base_offset,
            floors,
            overlay_radar,
            overlay_buyzones,
            aux_overlays,
        } = raw;

        if map_id.trim().is_empty() {
            return Err(invalid_record(&map_id, "map id is empty"));
        }

        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(invalid_record(
                &map_id,
                format!("resolution must be a positive number, got {resolution}"),
            ));
        }

        if !base_offset.is_finite() {
            return Err(invalid_record(&map_id, "base offset is not finite"));
        }

        let overlay_radar = match overlay_radar {
            Some(overlay) if !overlay.is_empty() => overlay,
            _ => return Err(invalid_record(&map_id, "radar overlay is missing")),
        };

        if overlay_buyzones.as_ref().is_some_and(ImageRef::is_empty) {
            return Err(invalid_record(&map_id, "buy zone overlay is declared but empty"));
        }

        let mut aux = IndexMap::with_capacity(aux_overlays.len());
        for (name, overlay) in aux_overlays {
            if name.trim().is_empty() {
                return Err(invalid_record(&map_id, "auxiliary overlay has an empty name"));
            }
            if RESERVED_LAYER_NAMES.contains(&name.as_str()) {
                return Err(invalid_record(
                    &map_id,
                    format!("auxiliary overlay name {name:?} is reserved"),
                ));
            }
            if overlay.is_empty() {
                return Err(invalid_record(
                    &map_id,
                    format!("auxiliary overlay {name:?} is declared but empty"),
                ));
            }
            if aux.contains_key(&name) {
                return Err(invalid_record(
                    &map_id,
                    format!("auxiliary overlay {name:?} is declared twice"),
                ));
            }
            aux.insert(name, overlay);
        }

        let floors = floors
            .into_iter()
            .enumerate()
            .map(|(idx, floor)| {
                let offset = floor.offset.unwrap_or(Offset2D::ZERO);
                if !offset.is_finite() {
                    return Err(invalid_record(
                        &map_id,
                        format!("floor {idx} offset is not finite"),
                    ));
                }
                if !floor.z_range.is_valid() {
                    return Err(invalid_record(
                        &map_id,
                        format!("floor {idx} has an invalid z range {}", floor.z_range),
                    ));
                }
                let overlay = match floor.overlay {
                    Some(overlay) if overlay.is_empty() => {
                        return Err(invalid_record(
                            &map_id,
                            format!("floor {idx} overlay is declared but empty"),
                        ));
                    }
                    Some(overlay) => overlay,
                    None => overlay_radar.clone(),
                };
                Ok(FloorDescriptor {
                    offset,
                    z_range: floor.z_range,
                    overlay,
                })
            })
            .collect::<IResult<Vec<_>>>()?;

        debug!(map = %map_id, floors = floors.len(), "validated map record");

        Ok(MapRecord {
            map_id: MapId::new(map_id),
            display_name,
            resolution,
            base_offset,
            floors,
            overlay_radar,
            overlay_buyzones,
            aux_overlays: aux,
        })
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_ref()
    }

    /// World units per pixel.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn base_offset(&self) -> Offset2D {
        self.base_offset
    }

    /// Floors in declaration order. Empty for single-level maps.
    pub fn floors(&self) -> &[FloorDescriptor] {
        self.floors.as_slice()
    }

    pub fn overlay_radar(&self) -> &ImageRef {
        &self.overlay_radar
    }

    pub fn overlay_buyzones(&self) -> Option<&ImageRef> {
        self.overlay_buyzones.as_ref()
    }

    pub fn aux_overlay(&self, name: &str) -> Option<&ImageRef> {
        self.aux_overlays.get(name)
    }

    /// Auxiliary layers drawn over the radar: buy zones first, then named layers in order.
    pub fn aux_overlays(&self) -> impl Iterator<Item = (&str, &ImageRef)> {
        self.overlay_buyzones
            .iter()
            .map(|overlay| ("buyzones", overlay))
            .chain(
                self.aux_overlays
                    .iter()
                    .map(|(name, overlay)| (name.as_str(), overlay)),
            )
    }
}

impl TryFrom<RawMapRecord> for MapRecord {
    type Error = crate::error::Error;

    fn try_from(raw: RawMapRecord) -> IResult<MapRecord> {
        MapRecord::new(raw)
    }
}

impl From<MapRecord> for RawMapRecord {
    fn from(record: MapRecord) -> Self {
        let radar = record.overlay_radar;
        RawMapRecord {
            map_id: record.map_id.as_str().to_string(),
            display_name: record.display_name,
            resolution: record.resolution,
            base_offset: record.base_offset,
            floors: record
                .floors
                .into_iter()
                .map(|floor| RawFloor {
                    offset: Some(floor.offset),
                    z_range: floor.z_range,
                    overlay: (floor.overlay != radar).then_some(floor.overlay),
                })
                .collect(),
            overlay_radar: Some(radar),
            overlay_buyzones: record.overlay_buyzones,
            aux_overlays: record.aux_overlays.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    fn vertigo() -> RawMapRecord {
        RawMapRecord::builder()
            .map_id("de_vertigo")
            .display_name("Vertigo")
            .resolution(4.96)
            .base_offset(Offset2D::new(3890.0, 3800.0))
            .floors(vec![
                RawFloor::builder()
                    .offset(Offset2D::new(0.2, -42.6))
                    .z_range(ZRange::new(11485.0, 11680.0))
                    .build(),
            ])
            .overlay_radar("de_vertigo/radar.png")
            .overlay_buyzones("de_vertigo/overlay_buyzones.png")
            .build()
    }

    fn assert_invalid(raw: RawMapRecord) {
        let err = MapRecord::new(raw).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::InvalidRecord { .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn builds_valid_record() {
        let record = MapRecord::new(vertigo()).unwrap();
        assert_eq!(record.map_id().as_str(), "de_vertigo");
        assert_eq!(record.display_name(), "Vertigo");
        assert_eq!(record.floors().len(), 1);
        assert_eq!(record.floors()[0].offset(), Offset2D::new(0.2, -42.6));
        // Floors without their own overlay use the radar image.
        assert_eq!(record.floors()[0].overlay(), record.overlay_radar());
    }

    #[test]
    fn rejects_zero_resolution() {
        let mut raw = vertigo();
        raw.resolution = 0.0;
        assert_invalid(raw);
    }

    #[test]
    fn rejects_negative_resolution() {
        let mut raw = vertigo();
        raw.resolution = -4.96;
        assert_invalid(raw);
    }

    #[test]
    fn rejects_nan_resolution() {
        let mut raw = vertigo();
        raw.resolution = f32::NAN;
        assert_invalid(raw);
    }

    #[test]
    fn rejects_inverted_z_range() {
        let mut raw = vertigo();
        raw.floors[0].z_range = ZRange::new(11680.0, 11485.0);
        assert_invalid(raw);
    }

    #[test]
    fn rejects_empty_map_id() {
        let mut raw = vertigo();
        raw.map_id = "  ".to_string();
        assert_invalid(raw);
    }

    #[test]
    fn rejects_missing_radar_overlay() {
        let mut raw = vertigo();
        raw.overlay_radar = None;
        assert_invalid(raw);

        let mut raw = vertigo();
        raw.overlay_radar = Some(ImageRef::from(""));
        assert_invalid(raw);
    }

    #[test]
    fn rejects_empty_declared_aux_overlay() {
        let mut raw = vertigo();
        raw.overlay_buyzones = Some(ImageRef::from(""));
        assert_invalid(raw);

        let mut raw = vertigo();
        raw.aux_overlays = vec![("callouts".to_string(), ImageRef::from(""))];
        assert_invalid(raw);
    }

    #[test]
    fn rejects_duplicate_aux_layer() {
        let mut raw = vertigo();
        raw.aux_overlays = vec![
            ("callouts".to_string(), ImageRef::from("a.png")),
            ("callouts".to_string(), ImageRef::from("b.png")),
        ];
        assert_invalid(raw);
    }

    #[test]
    fn rejects_reserved_aux_layer_names() {
        for name in ["buyzones", "radar"] {
            let mut raw = vertigo();
            raw.aux_overlays = vec![(name.to_string(), ImageRef::from("b2.png"))];
            assert_invalid(raw);
        }
    }

    #[cfg(feature = "json")]
    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "mapId": "de_x",
            "displayName": "X",
            "resolution": 5.0,
            "baseOffset": { "x": 10.0, "y": 20.0 },
            "overlayRadar": "r.png",
            "overlayBuyzones": "b.png",
            "auxOverlays": [["callouts", "c.png"]],
            "floors": [{ "zRange": { "min": 0.0, "max": 1.0 } }]
        }"#;
        let raw: RawMapRecord = serde_json::from_str(json).unwrap();
        let record = MapRecord::new(raw).unwrap();
        assert_eq!(record.map_id().as_str(), "de_x");
        assert_eq!(record.base_offset(), Offset2D::new(10.0, 20.0));
        assert_eq!(record.floors()[0].z_range(), ZRange::new(0.0, 1.0));
        assert_eq!(record.aux_overlay("callouts"), Some(&ImageRef::from("c.png")));

        let again: MapRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(record, again);
    }

    #[test]
    fn aux_overlays_in_order() {
        let mut raw = vertigo();
        raw.aux_overlays = vec![
            ("callouts".to_string(), ImageRef::from("callouts.png")),
            ("spawns".to_string(), ImageRef::from("spawns.png")),
        ];
        let record = MapRecord::new(raw).unwrap();
        let names: Vec<&str> = record.aux_overlays().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["buyzones", "callouts", "spawns"]);
        assert_eq!(
            record.aux_overlay("spawns"),
            Some(&ImageRef::from("spawns.png"))
        );
    }

    #[test]
    fn raw_conversion_preserves_record() {
        let record = MapRecord::new(vertigo()).unwrap();
        let again = MapRecord::new(RawMapRecord::from(record.clone())).unwrap();
        assert_eq!(record, again);
    }
}
