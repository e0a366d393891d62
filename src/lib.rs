/// Maps shipped with the radar
pub mod builtin;
/// Error definitions
pub mod error;
/// Floor selection from a world-space altitude
pub mod floor;
/// Loading map records from the radar web app's JSON format
#[cfg(feature = "json")]
pub mod loader;
/// World-space to overlay pixel projection
pub mod projection;
/// Validated per-map metadata
pub mod record;
/// Map id to record lookup, including hot-swappable registries
pub mod registry;
/// Identifiers, positions and ranges shared across the crate
pub mod types;

pub use error::{Error, ErrorKind, IResult};
pub use floor::{FloorDiagnostic, FloorIndex, FloorResolution, ResolvedFloor, resolve_floor};
pub use projection::{Placement, Projection, locate, project};
pub use record::{FloorDescriptor, MapRecord, RawFloor, RawMapRecord};
pub use registry::{MapRegistry, SharedRegistry};
pub use types::{ImageRef, MapId, Offset2D, PixelPos, WorldPos, ZRange};
