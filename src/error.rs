/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A wait deadline expired before the condition produced a value.
    #[error("condition not satisfied within {waited_ms} ms")]
    Timeout { waited_ms: u64 },
    /// No element matched the locator within the wait window.
    #[error("no element matched {locator} within {waited_ms} ms")]
    NotFound {
        /// Rendered locator (strategy plus selector).
        locator: String,
        /// Elapsed milliseconds when the search was abandoned.
        waited_ms: u64,
    },
    /// All attempts exhausted on transport-level faults.
    #[error("request failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        /// Number of attempts actually made.
        attempts: usize,
        /// Transport error from the final attempt.
        source: reqwest::Error,
    },
    /// Response arrived but its status was not the expected one.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// Response body was not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// UI surface rejected an interaction (stale element, click intercepted).
    #[error("surface error: {0}")]
    Surface(String),
}
