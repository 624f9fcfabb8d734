//! Client-side behaviour for the firm's marketing site.
//!
//! The modules below `config` through `sections` are plain Rust and run
//! anywhere; `browser` and `frontend` bind them to the DOM on `wasm32`.

pub mod config;
pub mod counter;
pub mod error;
pub mod form;
pub mod logging;
pub mod notify;
pub mod reveal;
pub mod schedule;
pub mod scroll;
pub mod sections;

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use config::SiteConfig;
pub use error::{SiteError, ValidationFailure};
