//! TUI pane rendering modules
//!
//! Each pane is a stateless render function over data borrowed from the
//! [`crate::snapshot::Report`]; scroll offsets live in the app.
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with the current line highlighted, plus its hint
//! - [`variables`]: Bindings captured at the current step
//! - [`output`]: Output printed so far, and the failure summary at the end
//! - [`outline`]: Static algorithm steps of the submission
//! - [`status`]: Status bar with keybindings and position

pub mod outline;
pub mod output;
pub mod source;
pub mod status;
pub mod variables;

pub use outline::render_outline_pane;
pub use output::render_output_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use variables::render_variables_pane;
