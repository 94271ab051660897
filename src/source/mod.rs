pub mod raw;
pub mod table;

pub use raw::{ListingEntry, RawTable, read_raw_table};
pub use table::read_records;
