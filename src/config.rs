/// Pipeline configuration.
///
/// Everything tunable — API base URL, retry limits, boost keywords, the
/// quantity imputation constant — is an explicit value passed into the
/// fetcher/classifier rather than ambient module state. Defaults match the
/// documented pipeline contract; a TOML file overrides them field by field.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Fetch settings
// ---------------------------------------------------------------------------

/// Settings for the openFDA enforcement fetch, including the retry budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// openFDA drug enforcement endpoint.
    pub base_url: String,
    /// Per-request timeout, seconds.
    pub timeout_secs: u64,
    /// Attempt ceiling per HTTP request (first try included).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry so
    /// every delay is strictly greater than the previous.
    pub base_backoff_ms: u64,
    /// Optional openFDA API key, sent as the `api_key` query parameter.
    /// Usually supplied via the OPENFDA_API_KEY environment variable
    /// rather than the config file.
    pub api_key: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.fda.gov/drug/enforcement.json".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            base_backoff_ms: 500,
            api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier settings
// ---------------------------------------------------------------------------

/// Settings for severity derivation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Ordered high-risk keywords scanned (case-insensitive substring)
    /// against the recall reason. Any match escalates severity one tier.
    /// The default uses "serious injury" rather than the bare word so that
    /// phrasings like "no injury reported" do not escalate.
    pub boost_keywords: Vec<String>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            boost_keywords: vec![
                "death".to_string(),
                "serious injury".to_string(),
                "contamination".to_string(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer settings
// ---------------------------------------------------------------------------

/// Settings for record normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Imputed quantity when a batch has no same-tier quantities to take a
    /// median of. Must be non-negative.
    pub fallback_quantity: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { fallback_quantity: 1.0 }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Full pipeline configuration, loadable from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub classify: ClassifyConfig,
    pub normalize: NormalizeConfig,
}

impl PipelineConfig {
    /// Loads configuration from a TOML file, e.g. "./recmon.toml".
    /// Missing fields fall back to their defaults.
    pub fn load(path: &str) -> Result<PipelineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
        let mut config: PipelineConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(format!("{}: {}", path, e)))?;
        if config.fetch.api_key.is_none() {
            config.fetch.api_key = api_key_from_env();
        }
        Ok(config)
    }

    /// Defaults plus any OPENFDA_API_KEY from the environment. Used when no
    /// config file is present.
    pub fn from_env() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.fetch.api_key = api_key_from_env();
        config
    }
}

/// Reads the openFDA API key from the environment (populated from `.env`
/// by the binary via dotenv). Empty values count as absent.
pub fn api_key_from_env() -> Option<String> {
    std::env::var("OPENFDA_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Errors loading or parsing the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
