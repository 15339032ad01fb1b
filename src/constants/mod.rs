//! Explorer constants organized by domain.
//!
//! Tuning values that are not user configuration live here; anything a user
//! may want to change belongs in `config`.

mod shader;
mod ui;
mod viewport;

pub use shader::*;
pub use ui::*;
pub use viewport::*;
