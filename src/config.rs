use std::time::Duration;

/// How long each timed phase runs before the deadline forces a transition.
#[derive(Debug, Clone)]
pub struct PhaseTimings {
    /// Writing window for caption submissions
    pub caption: Duration,
    /// How long each submission is shown during review
    pub review: Duration,
    /// How long the per-round results stay on screen
    pub result: Duration,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            caption: Duration::from_secs(60),
            review: Duration::from_secs(15),
            result: Duration::from_secs(40),
        }
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub timings: PhaseTimings,
}

impl Config {
    /// Load config from environment variables, falling back to defaults.
    /// Recognized: PORT, CAPTION_SECONDS, REVIEW_SECONDS, RESULT_SECONDS.
    pub fn from_env() -> Self {
        let defaults = PhaseTimings::default();
        Self {
            port: env_parse("PORT").unwrap_or(9090),
            timings: PhaseTimings {
                caption: env_secs("CAPTION_SECONDS").unwrap_or(defaults.caption),
                review: env_secs("REVIEW_SECONDS").unwrap_or(defaults.review),
                result: env_secs("RESULT_SECONDS").unwrap_or(defaults.result),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9090,
            timings: PhaseTimings::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| match v.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring unparsable value for {}: {:?}", name, v);
            None
        }
    })
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}
