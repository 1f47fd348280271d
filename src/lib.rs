//! `travelsearch-testkit` is an async toolkit for test automation against a
//! travel-search site.
//!
//! Two independent pieces:
//! - [`Wait`] — polls UI element state through a pluggable [`UiSurface`]
//!   until a condition holds or a deadline expires.
//! - [`ApiClient`] — issues HTTP requests with bounded retry on transport
//!   faults, plus the concrete [`PlacesClient`] and [`FlightsClient`] built
//!   on top of it.
//!
//! # Example
//!
//! ```no_run
//! use travelsearch_testkit::{places, HarnessConfig, PlacesClient};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = HarnessConfig::from_env().map_err(anyhow::Error::msg)?;
//! let suggest = PlacesClient::from_config(&config);
//!
//! let found = suggest.search_post("Sochi", "en").await?;
//! println!("cities: {:?}", places::city_names(&found));
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod flights;
pub mod places;
pub mod surface;
mod wait;

pub use client::{ApiClient, RawResponse, RequestSpec};
pub use config::{ClientOptions, HarnessConfig, WaitOptions};
pub use error::HarnessError;
pub use flights::{FlightQuery, FlightsClient};
pub use places::{Place, PlacesClient};
pub use reqwest::Method;
pub use surface::{Locator, UiElement, UiSurface};
pub use wait::{poll_until, Wait};

pub type Result<T> = std::result::Result<T, HarnessError>;
