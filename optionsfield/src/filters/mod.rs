//! Filter capability shared by every storage adapter.
//!
//! Options fields support equality and membership filters over the whole flag
//! set. Per-option filters (`colors_red: true`) are not offered yet.

pub mod conditions;
pub mod inputs;

pub use conditions::*;
pub use inputs::*;
