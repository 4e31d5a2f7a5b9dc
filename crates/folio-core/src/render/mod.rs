//! Console report rendering
//!
//! Purely presentational: nothing here feeds back into the context.

pub mod creator_report;
pub mod works_table;

pub use creator_report::{render_creator_report, write_creator_report};
pub use works_table::render_works_table;
