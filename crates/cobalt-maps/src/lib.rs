//! Places provider client backed by the `SerpApi` Google Maps engines.

pub mod client;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod types;

pub use client::SerpApiClient;
pub use error::MapsError;
pub use gateway::{Directions, Endpoint, GeocodeResult, PlaceDetails, PlacesGateway, SEARCH_RADIUS_M};
