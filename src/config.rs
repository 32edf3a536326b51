use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://resultatservice-api.stage-sumo.tv2.no/api/graphql";
pub const DEFAULT_TOURNAMENT_STAGE_ID: &str = "4e50ba57-d5fe-4370-b2f8-e357ebeb4c83";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub tournament_stage_id: String,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Reads `.env.local`, then `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let endpoint = non_empty("RESULTS_API_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let tournament_stage_id = non_empty("RESULTS_TOURNAMENT_STAGE_ID")
            .unwrap_or_else(|| DEFAULT_TOURNAMENT_STAGE_ID.to_string());
        let timeout_secs = non_empty("RESULTS_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let log_file = non_empty("RESULTS_LOG_FILE").map(PathBuf::from);

        Self {
            endpoint,
            tournament_stage_id,
            request_timeout: Duration::from_secs(timeout_secs),
            log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(|key| match key {
            "RESULTS_API_URL" => Some("   ".to_string()),
            "RESULTS_TIMEOUT_SECS" => Some("abc".to_string()),
            _ => None,
        });
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.tournament_stage_id, DEFAULT_TOURNAMENT_STAGE_ID);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn overrides_are_trimmed_and_timeout_clamped() {
        let config = Config::from_lookup(|key| match key {
            "RESULTS_API_URL" => Some(" http://localhost:4000/graphql ".to_string()),
            "RESULTS_TOURNAMENT_STAGE_ID" => Some("stage-1".to_string()),
            "RESULTS_TIMEOUT_SECS" => Some("900".to_string()),
            "RESULTS_LOG_FILE" => Some("/tmp/results.log".to_string()),
            _ => None,
        });
        assert_eq!(config.endpoint, "http://localhost:4000/graphql");
        assert_eq!(config.tournament_stage_id, "stage-1");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/results.log")));
    }
}
