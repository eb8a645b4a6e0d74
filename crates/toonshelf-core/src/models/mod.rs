//! Data models shared across crates.

mod image;

pub use image::*;
