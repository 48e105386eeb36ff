//! # Locator HTML
//!
//! Reduces a raw page snapshot to the markup that matters for locating
//! elements before it is sent to an inference service.
//!
//! Two stages run in order:
//!
//! - a text pre-pass (`regex`) that drops comments and framework bulk attributes
//! - a structural pass (`lol_html`) that drops scripts, styles, metadata,
//!   vector graphics, embedded media and presentation attributes
//!
//! The reducer is fail-open: if the structural pass errors, the pre-pass
//! output is returned unchanged.

#![warn(missing_docs)]

mod prepass;
mod reducer;

pub use prepass::text_prepass;
pub use reducer::{reduce_snapshot, structural_pass, ReducerOptions, SnapshotReducer};
