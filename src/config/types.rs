use serde::Deserialize;

/// Main configuration structure for Scrobble-Ripple
///
/// Every section and key is optional; missing values fall back to the
/// defaults below, so an empty file is a valid configuration (apart from the
/// API key, which can also come from the command line).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Remote API access configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Endpoint every request is sent to
    pub base_url: String,

    /// Static API key injected into every request
    pub api_key: String,

    /// Minimum time between two dispatched requests (milliseconds)
    pub min_interval_ms: u64,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ws.audioscrobbler.com/2.0/".to_string(),
            api_key: String::new(),
            min_interval_ms: 1000,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Crawl policy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Neighbor field compared by the accept predicate
    pub accept_field: String,

    /// Value the accept field must equal for a neighbor to be kept
    pub accept_value: String,

    /// Hard cap on accepted entities, counting those already in the acceptance sink
    pub max_accepted: u64,

    /// Page size used when downloading histories
    pub history_page_size: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            accept_field: "country".to_string(),
            accept_value: "Finland".to_string(),
            max_accepted: 100_000,
            history_page_size: 200,
        }
    }
}

/// Output sink configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Accepted entities, one per line
    pub names_path: String,

    /// Entities whose expansion has been attempted, one per line
    pub expanded_path: String,

    /// Scrobble rows written by the batch history crawl
    pub scrobbles_path: String,

    /// Users whose history has been written, one per line
    pub done_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            names_path: "fi_names.txt".to_string(),
            expanded_path: "expanded_names.txt".to_string(),
            scrobbles_path: "scrobbles.csv".to_string(),
            done_path: "done_names.txt".to_string(),
        }
    }
}
