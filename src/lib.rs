//! porchmap - Geocode porch festival listings into CSV and GeoJSON

pub mod api;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod logging;
pub mod output;
pub mod parse;
pub mod source;
