//! Remote listing image validation.
//!
//! Every photo attached to a listing must be a stable http(s) URL that
//! decodes to an image of at least [`MIN_WIDTH`]×[`MIN_HEIGHT`] pixels.
//! Fetching is abstracted behind [`ImageSource`] so validation can run
//! against in-memory bytes.

pub mod source;
pub mod validator;

pub use source::{FetchError, HttpImageSource, ImageSource};
pub use validator::{ImageCheck, ImageValidator, ImageVerdict};

pub use stayhaven_common::images::{MIN_HEIGHT, MIN_IMAGES, MIN_WIDTH};
