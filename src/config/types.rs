use serde::Deserialize;

/// Main configuration structure for Site-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Builds a configuration for `host` with every other section defaulted
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                host: host.into(),
                protocol: Protocol::default(),
            },
            output: OutputConfig::default(),
            download: DownloadConfig::default(),
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }

    /// The URL every canonical URL of this crawl starts with, e.g. `http://example.com/`
    pub fn base_url(&self) -> String {
        format!("{}://{}/", self.site.protocol.as_str(), self.site.host)
    }
}

/// Which site to mirror
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Host (optionally with port) to mirror, without scheme
    pub host: String,

    /// Scheme used for every request
    #[serde(default)]
    pub protocol: Protocol,
}

/// Request scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("unsupported protocol '{}'", other)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the remote tree is mirrored under
    #[serde(default = "default_output_root")]
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

fn default_output_root() -> String {
    "./mirror".to_string()
}

/// Which sub-resources of a page are followed
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Follow `<script src>` references
    #[serde(default = "default_true")]
    pub javascript: bool,

    /// Follow `<link href>` references
    #[serde(default = "default_true")]
    pub css: bool,

    /// Follow `<img src>` references
    #[serde(default = "default_true")]
    pub images: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            javascript: true,
            css: true,
            images: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-connections", default = "default_max_connections")]
    pub max_connections: u32,

    /// Length of one idle-detection tick (milliseconds)
    #[serde(rename = "tick-interval-ms", default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Consecutive idle ticks required before the crawl is declared finished
    #[serde(rename = "idle-ticks", default = "default_idle_ticks")]
    pub idle_ticks: u32,

    /// Stop dispatching after this many fetches
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Drop references discovered deeper than this many hops from the seed
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            tick_interval_ms: default_tick_interval_ms(),
            idle_ticks: default_idle_ticks(),
            max_pages: None,
            max_depth: None,
        }
    }
}

fn default_max_connections() -> u32 {
    1
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_idle_ticks() -> u32 {
    20
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version of the crawler
    #[serde(default = "default_agent_version")]
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
        }
    }
}

fn default_agent_name() -> String {
    "site-mirror".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
