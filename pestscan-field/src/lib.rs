//! Field-side data for farm management: geodesy helpers plus the mocked
//! weather and vegetation sources.

pub mod geo;
pub use geo::{geometry_area, haversine_km, nearest_first, LatLon};

pub mod weather;
pub use weather::{MockWeatherSource, WeatherSource};

pub mod indices;
pub use indices::{mock_indices, RECOMMENDATIONS};
