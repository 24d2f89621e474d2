//! Conversion of Jackett indexer records into custom indexer config lines.
//!
//! Every record maps to one [`FormattedConfig`] pointing at the indexer's
//! Torznab endpoint; [`ConfigLine`] wraps it as `{id}|{base64(json)}`.

mod encode;
mod format;
mod schema;
mod types;

pub use encode::ConfigLine;
pub use format::{derive_internal_id, format_batch, format_record, try_format_record};
pub use schema::{category_table, torznab_path, torznab_rules, ID_PREFIX, NAME_PREFIX};
pub use types::*;
