//! Explicit configuration passed to constructors at composition time.
//!
//! The harness keeps no process-wide mutable state: every `Wait` and every
//! `ApiClient` receives its own options struct, so components stay testable
//! in isolation.

/// Configures polling behavior of the wait engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WaitOptions {
    /// Default explicit-wait deadline in milliseconds.
    pub timeout_ms: u64,
    /// Delay between condition evaluations in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of send attempts. Consumed only by transport faults,
    /// never by an HTTP error status. Values below 1 behave as 1.
    pub retry_budget: usize,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            retry_budget: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// Aggregate harness configuration: wait budgets, HTTP behavior, API
/// endpoints and credentials.
#[derive(Clone, Debug, PartialEq)]
pub struct HarnessConfig {
    /// Explicit-wait options used by page-level abstractions.
    pub wait: WaitOptions,
    /// Implicit-wait deadline applied at session setup, in milliseconds.
    pub implicit_wait_ms: u64,
    /// HTTP options shared by API clients built from this config.
    pub http: ClientOptions,
    /// Base URL of the places-autocomplete API.
    pub suggest_api_url: String,
    /// Base URL of the flight-search API.
    pub flight_api_url: String,
    /// Access token for authorized API surfaces, if any.
    pub api_token: Option<String>,
    /// Target browser identifier for session provisioning.
    pub browser: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            implicit_wait_ms: 5_000,
            http: ClientOptions::default(),
            suggest_api_url: "https://autocomplete.travelpayouts.com/places2".to_owned(),
            flight_api_url: "https://api.travelpayouts.com/v1/flights/search".to_owned(),
            api_token: None,
            browser: "chrome".to_owned(),
        }
    }
}

impl HarnessConfig {
    /// Builds a config from environment variables, falling back to defaults
    /// for anything unset.
    ///
    /// Reads:
    /// - `TRAVELKIT_SUGGEST_URL` — places-autocomplete base URL
    /// - `TRAVELKIT_FLIGHT_URL` — flight-search base URL
    /// - `TRAVELKIT_API_TOKEN` — access token
    /// - `TRAVELKIT_BROWSER` — browser identifier
    /// - `TRAVELKIT_EXPLICIT_WAIT_MS`, `TRAVELKIT_HTTP_TIMEOUT_MS`,
    ///   `TRAVELKIT_RETRY_BUDGET` — numeric overrides
    ///
    /// Returns an error naming the variable when a numeric override does not
    /// parse or a set variable is empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        let mut config = Self::default();

        if let Some(url) = read_env("TRAVELKIT_SUGGEST_URL")? {
            config.suggest_api_url = url;
        }
        if let Some(url) = read_env("TRAVELKIT_FLIGHT_URL")? {
            config.flight_api_url = url;
        }
        if let Some(token) = read_env("TRAVELKIT_API_TOKEN")? {
            config.api_token = Some(token);
        }
        if let Some(browser) = read_env("TRAVELKIT_BROWSER")? {
            config.browser = browser;
        }
        if let Some(ms) = read_env_number("TRAVELKIT_EXPLICIT_WAIT_MS")? {
            config.wait.timeout_ms = ms;
        }
        if let Some(ms) = read_env_number("TRAVELKIT_HTTP_TIMEOUT_MS")? {
            config.http.timeout_ms = ms;
        }
        if let Some(budget) = read_env_number("TRAVELKIT_RETRY_BUDGET")? {
            config.http.retry_budget = budget as usize;
        }

        Ok(config)
    }
}

fn read_env(name: &str) -> std::result::Result<Option<String>, String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(format!("{name} is set but empty")),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

fn read_env_number(name: &str) -> std::result::Result<Option<u64>, String> {
    match read_env(name)? {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| format!("{name} is not a number: {value}")),
        None => Ok(None),
    }
}
