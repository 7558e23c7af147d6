//! Output formatting for the cqlf CLI.
//!
//! Every command prints either a human-readable table or JSON.

mod constraints;
mod filters;
mod helpers;
mod records;

pub use constraints::{format_constraints_json, format_constraints_table};
pub use filters::{format_filters_json, format_filters_table};
pub use records::{
    format_groups_json, format_groups_table, format_records_json, format_records_table,
};
