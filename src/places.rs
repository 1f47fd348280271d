//! Client for the places-autocomplete endpoint.
//!
//! The upstream accepts GET and POST interchangeably and reads everything
//! from the query string, including the repeated `types[]` parameter.

use std::collections::BTreeSet;

use reqwest::Method;
use serde::Deserialize;

use crate::{ApiClient, ClientOptions, HarnessConfig, RequestSpec, Result};

/// Place kinds requested when the caller does not say otherwise.
pub const DEFAULT_PLACE_KINDS: &[&str] = &["city", "airport"];

/// One autocomplete suggestion. Unknown upstream fields are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Place {
    /// Suggestion kind: `city`, `airport`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the owning city, set on airport entries.
    #[serde(default)]
    pub city_name: Option<String>,
    /// IATA code, set on airport entries.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

/// Client for the places-autocomplete API; no authorization required.
#[derive(Clone, Debug)]
pub struct PlacesClient {
    api: ApiClient,
}

impl PlacesClient {
    /// Creates a client for the autocomplete endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiClient::new(base_url),
        }
    }

    /// Creates a client from the harness config's autocomplete settings.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.suggest_api_url.clone()).with_options(config.http.clone())
    }

    /// Applies HTTP options such as timeout and retry behavior.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.api = self.api.with_options(options);
        self
    }

    /// Searches cities and airports via GET.
    pub async fn search_get(&self, term: &str, locale: &str) -> Result<Vec<Place>> {
        self.search(Method::GET, term, locale, DEFAULT_PLACE_KINDS)
            .await
    }

    /// Searches cities and airports via POST.
    pub async fn search_post(&self, term: &str, locale: &str) -> Result<Vec<Place>> {
        self.search(Method::POST, term, locale, DEFAULT_PLACE_KINDS)
            .await
    }

    /// Searches with an explicit method and place-kind filter.
    pub async fn search(
        &self,
        method: Method,
        term: &str,
        locale: &str,
        kinds: &[&str],
    ) -> Result<Vec<Place>> {
        let mut spec = RequestSpec::new(method, "")
            .query("term", term)
            .query("locale", locale);
        for kind in kinds {
            spec = spec.query("types[]", *kind);
        }
        self.api.send(spec).await?.expect_ok_as()
    }
}

/// Distinct city names from a suggestion list, with airport entries falling
/// back to their owning city's name.
pub fn city_names(places: &[Place]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for place in places {
        if place.kind != "city" {
            continue;
        }
        let name = place.name.as_deref().or(place.city_name.as_deref());
        if let Some(name) = name.filter(|name| !name.is_empty()) {
            names.insert(name.to_owned());
        }
    }
    names.into_iter().collect()
}

/// IATA codes of the airport entries in a suggestion list.
pub fn iata_codes(places: &[Place]) -> Vec<String> {
    places
        .iter()
        .filter(|place| place.kind == "airport")
        .filter_map(|place| place.code.clone())
        .filter(|code| !code.is_empty())
        .collect()
}
