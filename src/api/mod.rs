pub mod artist_page;
pub mod geocoder;

pub use artist_page::{ArtistPageClient, image_extension};
pub use geocoder::{GeocodeError, GeocodeResult, Geocoder, NominatimClient, qualify};
