//! Metadata for maps shipped with the radar.

use crate::error::IResult;
use crate::record::{RawFloor, RawMapRecord};
use crate::registry::MapRegistry;
use crate::types::{Offset2D, ZRange};

pub fn de_vertigo() -> RawMapRecord {
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

/// All built-in records, unvalidated.
pub fn builtin_records() -> Vec<RawMapRecord> {
    vec![de_vertigo()]
}

/// Validate the built-in records and build a fresh registry from them.
pub fn builtin_registry() -> IResult<MapRegistry> {
    let mut registry = MapRegistry::new();
    for raw in builtin_records() {
        registry.register_raw(raw)?;
    }
    Ok(registry)
}
