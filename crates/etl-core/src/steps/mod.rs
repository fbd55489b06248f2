//! Built-in step units
//!
//! Every `*.rs` file in this folder is a step unit; `build.rs` declares the
//! modules and the [`STEP_UNITS`] table, so adding a step means adding a file.

include!(concat!(env!("OUT_DIR"), "/step_units.rs"));
