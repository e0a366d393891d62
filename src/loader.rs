//! Reads map records in the radar web app's JSON shape:
//!
//! ```json
//! {
//!     "mapName": "de_vertigo",
//!     "displayName": "Vertigo",
//!     "metaInfo": {
//!         "resolution": 4.96,
//!         "offset": { "x": 3890, "y": 3800 },
//!         "floors": [
//!             { "offset": { "x": 0.2, "y": -42.6 }, "zRange": { "min": 11485, "max": 11680 } }
//!         ]
//!     },
//!     "overlayRadar": "de_vertigo/radar.png",
//!     "overlayBuyzones": "de_vertigo/overlay_buyzones.png"
//! }
//! ```
//!
//! Any other `overlay*` key becomes a named auxiliary layer (`overlayCallouts` → `callouts`).
//! Input may be a single record or an array of records.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::{IResult, invalid_record};
use crate::record::{RawFloor, RawMapRecord};
use crate::registry::MapRegistry;
use crate::types::{ImageRef, Offset2D, ZRange};

const OVERLAY_PREFIX: &str = "overlay";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebMapRecord {
    map_name: String,
    #[serde(default)]
    display_name: String,
    meta_info: WebMetaInfo,
    #[serde(default)]
    overlay_radar: Option<ImageRef>,
    #[serde(default)]
    overlay_buyzones: Option<ImageRef>,
    #[serde(flatten)]
    rest: IndexMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebMetaInfo {
    resolution: f32,
    #[serde(default)]
    offset: Offset2D,
    #[serde(default)]
    floors: Vec<WebFloor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebFloor {
    #[serde(default)]
    offset: Option<Offset2D>,
    z_range: ZRange,
    #[serde(default)]
    overlay: Option<ImageRef>,
}

impl WebMapRecord {
    fn into_raw(self) -> IResult<RawMapRecord> {
        let mut aux_overlays = Vec::new();
        for (key, value) in self.rest {
            let Some(name) = key.strip_prefix(OVERLAY_PREFIX).filter(|n| !n.is_empty()) else {
                debug!(map = %self.map_name, key = %key, "ignoring unknown record field");
                continue;
            };
            let serde_json::Value::String(path) = value else {
                return Err(invalid_record(
                    &self.map_name,
                    format!("overlay {key:?} is not an asset reference"),
                ));
            };
            aux_overlays.push((layer_name(name), ImageRef::new(path)));
        }

        let floors = self
            .meta_info
            .floors
            .into_iter()
            .map(|floor| {
                RawFloor::builder()
                    .maybe_offset(floor.offset)
                    .z_range(floor.z_range)
                    .maybe_overlay(floor.overlay)
                    .build()
            })
            .collect();

        Ok(RawMapRecord::builder()
            .map_id(self.map_name)
            .display_name(self.display_name)
            .resolution(self.meta_info.resolution)
            .base_offset(self.meta_info.offset)
            .floors(floors)
            .maybe_overlay_radar(self.overlay_radar)
            .maybe_overlay_buyzones(self.overlay_buyzones)
            .aux_overlays(aux_overlays)
            .build())
    }
}

/// `Callouts` → `callouts`, `BombSites` → `bombSites`.
fn layer_name(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse one record or an array of records. Records are not validated here.
pub fn records_from_json(json: &str) -> IResult<Vec<RawMapRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let records: Vec<WebMapRecord> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    debug!(count = records.len(), "parsed map records");
    records.into_iter().map(WebMapRecord::into_raw).collect()
}

/// Parse, validate and register every record in `json`.
///
/// Fails on the first invalid or duplicate record; no partially populated registry is returned.
pub fn registry_from_json(json: &str) -> IResult<MapRegistry> {
    let mut registry = MapRegistry::new();
    for raw in records_from_json(json)? {
        registry.register_raw(raw)?;
    }
    Ok(registry)
}
