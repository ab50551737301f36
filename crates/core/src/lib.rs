pub mod domain;
pub mod ingest;
pub mod scoring;
pub mod screener;
pub mod view;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_crumb: Option<String>,
        pub market_data_cookie: Option<String>,
        pub market_data_user_agent: Option<String>,
        pub market_data_timeout_secs: Option<String>,
        pub market_data_retries: Option<String>,
        pub port: Option<String>,
        pub hide_chrome: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_crumb: std::env::var("MARKET_DATA_CRUMB").ok(),
                market_data_cookie: std::env::var("MARKET_DATA_COOKIE").ok(),
                market_data_user_agent: std::env::var("MARKET_DATA_USER_AGENT").ok(),
                market_data_timeout_secs: std::env::var("MARKET_DATA_TIMEOUT_SECS").ok(),
                market_data_retries: std::env::var("MARKET_DATA_RETRIES").ok(),
                port: std::env::var("PORT").ok(),
                hide_chrome: std::env::var("STOCKDASH_HIDE_CHROME").ok(),
            })
        }

        pub fn port(&self) -> anyhow::Result<u16> {
            match self.port.as_deref() {
                Some(p) => p
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a valid port number (got {p:?})")),
                None => Ok(3000),
            }
        }

        pub fn market_data_timeout_secs(&self) -> anyhow::Result<Option<u64>> {
            self.market_data_timeout_secs
                .as_deref()
                .map(|s| {
                    s.trim().parse::<u64>().with_context(|| {
                        format!("MARKET_DATA_TIMEOUT_SECS must be a whole number (got {s:?})")
                    })
                })
                .transpose()
        }

        pub fn market_data_retries(&self) -> anyhow::Result<Option<u32>> {
            self.market_data_retries
                .as_deref()
                .map(|s| {
                    s.trim().parse::<u32>().with_context(|| {
                        format!("MARKET_DATA_RETRIES must be a whole number (got {s:?})")
                    })
                })
                .transpose()
        }

        /// Whether pages hide the default header/footer chrome. Defaults to true.
        pub fn hide_chrome(&self) -> bool {
            match self.hide_chrome.as_deref().map(str::trim) {
                Some("0") | Some("false") | Some("no") => false,
                _ => true,
            }
        }
    }

}
