//! Built-in provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::Provider`]
//! on top of one site's public JSON API.

pub mod doutub;
pub mod douyin;
pub mod sougou;

pub use doutub::DoutubProvider;
pub use douyin::DouyinProvider;
pub use sougou::SougouProvider;
