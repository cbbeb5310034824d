use crate::error::CoreError;

/// Default upstream for the chat proxy.
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory holding `visitors.json` and `daily-stats.json`.
    pub data_dir: String,
    /// When false, page requests are served but never recorded.
    pub analytics_enabled: bool,
    /// Bearer token required by the analytics read endpoints. `None` leaves them open.
    pub analytics_token: Option<String>,
    pub geoip_path: String,
    pub gemini_api_key: Option<String>,
    pub gemini_url: String,
    pub cors_origins: Vec<String>,
    pub site: SiteProfile,
}

/// Identity rendered into the SPA shell's SEO tags.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    /// Canonical base URL without a trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    pub owner: String,
    pub headline: String,
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: non_empty("FOLIO_PORT")
                .or_else(|| non_empty("PORT"))
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|e| CoreError::Config(format!("invalid port: {e}")))?,
            data_dir: non_empty("FOLIO_DATA_DIR").unwrap_or_else(|| "./analytics".to_string()),
            analytics_enabled: non_empty("FOLIO_ANALYTICS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            analytics_token: non_empty("FOLIO_ANALYTICS_TOKEN"),
            geoip_path: non_empty("FOLIO_GEOIP_PATH")
                .unwrap_or_else(|| "./GeoLite2-Country.mmdb".to_string()),
            gemini_api_key: non_empty("FOLIO_GEMINI_API_KEY"),
            gemini_url: non_empty("FOLIO_GEMINI_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            cors_origins: non_empty("FOLIO_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            site: SiteProfile {
                base_url: non_empty("FOLIO_SITE_URL")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
                owner: non_empty("FOLIO_SITE_OWNER").unwrap_or_else(|| "Folio".to_string()),
                headline: non_empty("FOLIO_SITE_HEADLINE")
                    .unwrap_or_else(|| "Software Engineer".to_string()),
            },
        })
    }
}
