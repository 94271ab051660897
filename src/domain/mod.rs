pub mod artist;
pub mod event;
pub mod row;

pub use artist::{ArtistLink, ArtistProfile};
pub use event::{Coordinates, EnrichedEvent, EventLocation, EventRecord, LocationRecord, map_link};
pub use row::{InputRow, REQUIRED_FIELDS, split_genres};
