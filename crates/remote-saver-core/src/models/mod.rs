//! Data models
//!
//! Raw images handed over by the host and the per-image result records handed
//! back to the host UI.

mod image;
mod upload;

pub use image::*;
pub use upload::*;
