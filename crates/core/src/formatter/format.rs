//! Record to config mapping.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::fetcher::{ConnectionSettings, IndexerRecord};
use crate::metrics::RECORDS_SKIPPED;

use super::schema::{
    category_table, torznab_path, torznab_rules, ENCODING, ID_PREFIX, LANGUAGE, NAME_PREFIX,
};
use super::types::{
    FormatError, FormattedConfig, FormattedIndexer, SearchParams, SearchPath, SearchTemplate,
};

/// Internal id for a Jackett indexer id: lower-cased, `-` replaced by `_`,
/// prefixed with `jackett_`.
///
/// Ids that differ only by case or by `-` versus `_` collide;
/// [`format_batch`] keeps the first of such records.
pub fn derive_internal_id(source_id: &str) -> String {
    format!("{}{}", ID_PREFIX, source_id.to_lowercase().replace('-', "_"))
}

/// Map one record, reporting why it was rejected.
pub fn try_format_record(
    record: &IndexerRecord,
    connection: &ConnectionSettings,
) -> Result<FormattedConfig, FormatError> {
    let id = record
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField("id"))?;
    let name = record
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(FormatError::MissingField("name"))?;

    let host = connection.base_url().to_string();

    Ok(FormattedConfig {
        id: derive_internal_id(id),
        name: format!("{}{}", NAME_PREFIX, name),
        domain: host.clone(),
        url: host,
        encoding: ENCODING.to_string(),
        public: true,
        proxy: true,
        language: LANGUAGE.to_string(),
        category: category_table(),
        search: SearchTemplate {
            paths: vec![SearchPath {
                path: torznab_path(id),
                method: "get".to_string(),
            }],
            params: SearchParams {
                t: "search".to_string(),
                q: "{keyword}".to_string(),
                cat: "{cat}".to_string(),
                apikey: connection.api_key().to_string(),
            },
        },
        torrents: torznab_rules(),
    })
}

/// Map one record, or `None` (logged) if it lacks an id or name.
pub fn format_record(
    record: &IndexerRecord,
    connection: &ConnectionSettings,
) -> Option<FormattedConfig> {
    match try_format_record(record, connection) {
        Ok(config) => {
            debug!(id = %config.id, "Formatted indexer config");
            Some(config)
        }
        Err(e) => {
            warn!(error = %e, record = ?record, "Skipping incomplete Jackett indexer record");
            None
        }
    }
}

/// Format a batch, skipping invalid records and internal id collisions.
pub fn format_batch(
    records: &[IndexerRecord],
    connection: &ConnectionSettings,
) -> Vec<FormattedIndexer> {
    let mut seen = HashSet::new();
    let mut formatted = Vec::with_capacity(records.len());

    for record in records {
        let Some(config) = format_record(record, connection) else {
            RECORDS_SKIPPED.with_label_values(&["invalid"]).inc();
            continue;
        };

        if !seen.insert(config.id.clone()) {
            warn!(
                id = %config.id,
                source_id = record.id.as_deref().unwrap_or_default(),
                "Internal id already used by another indexer, skipping"
            );
            RECORDS_SKIPPED.with_label_values(&["duplicate"]).inc();
            continue;
        }

        formatted.push(FormattedIndexer {
            source_name: record.name.clone().unwrap_or_default(),
            config,
        });
    }

    formatted
}
