//! Shared testing utilities for the Stayhaven workspace.

pub mod fixtures;
pub mod media;

pub use media::StaticImageSource;
