//! Fetch + format cycle behind the outbound API.

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::JackettConfig;
use crate::fetcher::{FetchError, IndexerFetchClient, IndexerRecord};
use crate::formatter::{format_batch, ConfigLine};
use crate::metrics::{CONFIG_LINES_GENERATED, RECORDS_SKIPPED};

use super::types::{ApiEnvelope, ConfigEntry, GenerationSummary, IndexerOption};

const BLOCK_BEGIN: &str = "----- BEGIN JACKETT CUSTOM INDEXER CONFIG -----";
const BLOCK_END: &str = "----- END JACKETT CUSTOM INDEXER CONFIG -----";

/// Generates custom indexer config lines from the configured Jackett instance.
///
/// At most one cycle runs at a time; concurrent callers wait for the
/// running cycle to finish before starting their own.
pub struct ConfigGenerator {
    fetcher: IndexerFetchClient,
    settings: JackettConfig,
    cycle: Mutex<()>,
    last_run: RwLock<Option<GenerationSummary>>,
}

impl ConfigGenerator {
    pub fn new(fetcher: IndexerFetchClient, settings: JackettConfig) -> Self {
        Self {
            fetcher,
            settings,
            cycle: Mutex::new(()),
            last_run: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &JackettConfig {
        &self.settings
    }

    /// Summary of the latest [`list_custom_configs`](Self::list_custom_configs) call.
    pub async fn last_run(&self) -> Option<GenerationSummary> {
        self.last_run.read().await.clone()
    }

    /// Fetch the indexers and produce one config line per valid record.
    pub async fn list_custom_configs(&self) -> ApiEnvelope<Vec<ConfigEntry>> {
        let _cycle = self.cycle.lock().await;

        let envelope = self.generate().await;

        let summary = GenerationSummary {
            generated_at: Utc::now(),
            code: envelope.code,
            message: envelope.message.clone(),
            lines: envelope.data.len(),
        };
        *self.last_run.write().await = Some(summary);

        envelope
    }

    async fn generate(&self) -> ApiEnvelope<Vec<ConfigEntry>> {
        let records = match self.fetch("list_custom_configs").await {
            Ok(records) => records,
            Err(envelope) => return envelope,
        };

        let connection = self.settings.connection();
        let selected: Vec<IndexerRecord> = records
            .iter()
            .filter(|record| {
                let keep = record
                    .id
                    .as_deref()
                    .map_or(true, |id| self.settings.is_selected(id));
                if !keep {
                    debug!(id = ?record.id, name = ?record.name, "Skipping unselected indexer");
                    RECORDS_SKIPPED.with_label_values(&["unselected"]).inc();
                }
                keep
            })
            .cloned()
            .collect();

        let mut entries = Vec::new();
        for formatted in format_batch(&selected, &connection) {
            match ConfigLine::encode(&formatted.config) {
                Ok(line) => entries.push(ConfigEntry {
                    name: formatted.source_name,
                    internal_id: line.id().to_string(),
                    config_string: line.to_string(),
                }),
                Err(e) => {
                    error!(
                        id = %formatted.config.id,
                        error = %e,
                        "Failed to encode indexer config"
                    );
                    RECORDS_SKIPPED.with_label_values(&["encode"]).inc();
                }
            }
        }

        if entries.is_empty() {
            warn!(
                fetched = records.len(),
                selected = selected.len(),
                "Fetched Jackett indexers but none produced a config line"
            );
            return ApiEnvelope::failed(
                "Connected to Jackett but no valid indexer config could be generated, check the logs",
            );
        }

        CONFIG_LINES_GENERATED.inc_by(entries.len() as u64);
        log_config_block(&entries);
        info!(lines = entries.len(), "Generated custom indexer configs");

        ApiEnvelope::ok(
            format!("Generated {} config lines", entries.len()),
            entries,
        )
    }

    /// Configured indexers as `{value, text}` options.
    pub async fn list_indexers(&self) -> ApiEnvelope<Vec<IndexerOption>> {
        let _cycle = self.cycle.lock().await;

        let records = match self.fetch("list_indexers").await {
            Ok(records) => records,
            Err(envelope) => return envelope,
        };

        let options: Vec<IndexerOption> = records
            .into_iter()
            .filter_map(|record| match (record.id, record.name) {
                (Some(id), Some(name)) if !id.is_empty() => Some(IndexerOption {
                    value: id,
                    text: name,
                }),
                _ => None,
            })
            .collect();

        if options.is_empty() {
            return ApiEnvelope::failed("Jackett returned no usable indexers");
        }

        ApiEnvelope::ok(format!("Found {} indexers", options.len()), options)
    }

    /// Pre-flight checks plus the fetch; failures become envelopes.
    async fn fetch<T: Default>(
        &self,
        operation: &str,
    ) -> Result<Vec<IndexerRecord>, ApiEnvelope<T>> {
        info!(operation, "Jackett config generation requested");

        if !self.settings.enabled {
            warn!(operation, "Rejected: Jackett integration is disabled");
            return Err(ApiEnvelope::failed("Jackett integration is disabled"));
        }

        let connection = self.settings.connection();
        if !connection.is_complete() {
            warn!(operation, "Rejected: Jackett host or API key not configured");
            return Err(ApiEnvelope::failed(
                "Set the Jackett host and API key in the configuration first",
            ));
        }

        match self.fetcher.try_fetch_indexers(&connection).await {
            Ok(records) if records.is_empty() => {
                Err(ApiEnvelope::failed("Jackett has no configured indexers"))
            }
            Ok(records) => Ok(records),
            Err(e) => Err(ApiEnvelope::failed(failure_message(&e))),
        }
    }
}

fn failure_message(e: &FetchError) -> String {
    format!("Could not fetch indexers from Jackett ({}): {}", e, e.hint())
}

/// Delimited block of every line, for copying out of the logs.
fn log_config_block(entries: &[ConfigEntry]) {
    let mut block = String::new();
    block.push_str(BLOCK_BEGIN);
    block.push('\n');
    for entry in entries {
        block.push_str(&entry.config_string);
        block.push('\n');
    }
    block.push_str(BLOCK_END);
    info!("Custom indexer config lines:\n{}", block);
}
