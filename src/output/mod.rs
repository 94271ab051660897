pub mod geojson;
pub mod json;
pub mod tabular;

pub use geojson::{Feature, FeatureCollection, Geometry, feature_collection, write_feature_collection};
pub use json::{write_artist_profile, write_events};
pub use tabular::{APPENDED_COLUMNS, write_tabular};
