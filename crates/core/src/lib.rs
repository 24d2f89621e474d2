pub mod auth;
pub mod config;
pub mod fetcher;
pub mod formatter;
pub mod generator;
pub mod metrics;
pub mod testing;

pub use auth::{ApiGuard, AuthError};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use fetcher::{
    ConnectionSettings, FailureKind, FetchError, IndexerFetchClient, IndexerRecord,
    ReqwestTransport, RetryPolicy, Session, Transport,
};
pub use formatter::{format_batch, format_record, ConfigLine, FormattedConfig};
pub use generator::{
    ApiEnvelope, ConfigEntry, ConfigGenerator, GenerationSummary, IndexerOption,
    RefreshScheduler,
};
