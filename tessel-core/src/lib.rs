//! Components and the update scheduler.
//!
//! Property and attribute writes on an [`Element`] are staged and queue the
//! element; a flush renders every queued element (including ones queued by
//! those renders) and then replays `after_update` children first.

pub mod component;
pub mod error;
pub mod scheduler;

pub use component::{Attrs, Component, Element, Props};
pub use error::{Phase, SchemaError, UpdateError};
pub use scheduler::{
    clear_renderer, flush, has_renderer, is_flush_scheduled, pending_count, set_renderer, tick,
};
pub use tessel_template::{Value, html, tpl};
