pub mod aggregate;
pub mod domain;
pub mod error;
pub mod scoring;
pub mod service;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub stakeholders: Option<Vec<String>>,
        pub trend_window: Option<usize>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let trend_window = match std::env::var("SENTIMENT_TREND_WINDOW") {
                Ok(s) => Some(parse_trend_window(&s)?),
                Err(_) => None,
            };

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                stakeholders: std::env::var("STAKEHOLDERS")
                    .ok()
                    .map(|s| parse_stakeholders(&s)),
                trend_window,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    fn parse_trend_window(s: &str) -> anyhow::Result<usize> {
        let window = s
            .trim()
            .parse::<usize>()
            .with_context(|| format!("SENTIMENT_TREND_WINDOW must be an integer (got {s:?})"))?;
        anyhow::ensure!(window >= 1, "SENTIMENT_TREND_WINDOW must be >= 1");
        Ok(window)
    }

    // "고객, 투자자,,직원" -> ["고객", "투자자", "직원"]
    fn parse_stakeholders(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

}
