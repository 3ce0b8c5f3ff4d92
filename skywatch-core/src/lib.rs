//! Core library for the `skywatch` station dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its weatherapi.com implementation
//! - Refresh scheduling, day/night resolution and launch-condition evaluation
//! - The per-session evaluation cycle that ties them together
//!
//! It is used by `skywatch-cli`, but can also be reused by other binaries or services.

pub mod astro;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod session;
pub mod view;

pub use config::{Config, LocationConfig, ProviderConfig, StationSettings};
pub use error::{FetchError, ParseError, Unavailability};
pub use evaluate::{AirQuality, LaunchSafety, Verdict, Violation};
pub use model::{AstroInfo, Coordinates, Observation, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use refresh::RefreshState;
pub use session::{CycleReport, Session, SharedSession};
pub use view::DerivedView;
