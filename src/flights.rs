//! Client for the flight-search endpoint.

use serde::Serialize;

use crate::{
    ApiClient, ClientOptions, HarnessConfig, HarnessError, RawResponse, RequestSpec, Result,
};

/// Flight search parameters, posted as the JSON request body.
///
/// `return_date` is omitted from the payload for one-way searches, matching
/// what the upstream expects.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FlightQuery {
    /// IATA code of the origin city.
    pub origin: String,
    /// IATA code of the destination city.
    pub destination: String,
    /// Departure date, `YYYY-MM-DD`.
    pub depart_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    /// 0 economy, 1 business, 2 first.
    pub trip_class: u8,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl FlightQuery {
    /// One-way economy search for a single adult.
    pub fn one_way(
        origin: impl Into<String>,
        destination: impl Into<String>,
        depart_date: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            depart_date: depart_date.into(),
            return_date: None,
            trip_class: 0,
            adults: 1,
            children: 0,
            infants: 0,
        }
    }

    /// Adds a return date, turning the search into a round trip.
    pub fn round_trip(mut self, return_date: impl Into<String>) -> Self {
        self.return_date = Some(return_date.into());
        self
    }

    /// Sets the trip class.
    pub fn trip_class(mut self, trip_class: u8) -> Self {
        self.trip_class = trip_class;
        self
    }

    /// Sets the passenger counts.
    pub fn passengers(mut self, adults: u32, children: u32, infants: u32) -> Self {
        self.adults = adults;
        self.children = children;
        self.infants = infants;
        self
    }
}

/// Client for the flight-search API; every request carries the access token.
#[derive(Clone, Debug)]
pub struct FlightsClient {
    api: ApiClient,
}

impl FlightsClient {
    /// Creates a client for the search endpoint at `base_url` with the given
    /// access token.
    pub fn new(base_url: impl Into<String>, token: impl AsRef<str>) -> Self {
        Self {
            api: ApiClient::with_token(base_url, token),
        }
    }

    /// Creates a client from the harness config's flight-search settings.
    ///
    /// Returns `None` when the config carries no `api_token`.
    pub fn from_config(config: &HarnessConfig) -> Option<Self> {
        let token = config.api_token.as_deref()?;
        Some(Self::new(config.flight_api_url.clone(), token).with_options(config.http.clone()))
    }

    /// Applies HTTP options such as timeout and retry behavior.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.api = self.api.with_options(options);
        self
    }

    /// Runs a search and returns the decoded body of a 200 response.
    pub async fn search(&self, query: &FlightQuery) -> Result<serde_json::Value> {
        self.search_raw(query).await?.expect_ok()
    }

    /// Runs a search and returns the raw response, whatever its status.
    ///
    /// For scenarios where a non-200 status is an accepted outcome, such as a
    /// 400 on a deliberately past departure date.
    pub async fn search_raw(&self, query: &FlightQuery) -> Result<RawResponse> {
        let body = serde_json::to_value(query)
            .map_err(|err| HarnessError::Decode(format!("unserializable flight query: {err}")))?;
        self.api.send(RequestSpec::post("").json(body)).await
    }
}
