//! Configuration and settings management.
//!
//! Settings are persisted as JSON under the user's config directory and
//! loaded at startup; every field has a default.

mod settings;

pub use settings::Settings;
