//! Timeline report building and rendering.
//!
//! - [`timeline`] — joins usage rows with categories into per-category series,
//!   legend order, colours, and the artifact file name.
//! - [`html`] — interactive Plotly page with legend toggling.
//! - [`png`] — static snapshot of the visible series.
//! - [`terminal`] — scan summary and category listing tables.

pub mod html;
pub mod png;
pub mod terminal;
pub mod timeline;
