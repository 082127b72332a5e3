//! Excite Script - RON presets for the excite meter
//!
//! Loads meter presets from RON files. A preset names a configuration,
//! a list of breakpoint events and a climax action, and converts into a
//! [`MeterSnapshot`](excite_core::MeterSnapshot) ready for
//! `Meter::restore`.

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{to_ron_string, write_file, Loader, PresetDefs};
pub use schema::{EventDef, PresetDef};
