pub mod artist_page;
pub mod html;
pub mod time_range;

pub use artist_page::{entry_id, parse_artist_page};
pub use html::{Anchor, parse_anchor};
pub use time_range::{EventClock, TimeRange, TimeRangeError};
