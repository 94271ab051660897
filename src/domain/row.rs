use csv::StringRecord;

/// Name, time range, genres and address: the columns every listing row needs.
pub const REQUIRED_FIELDS: usize = 4;

/// One listing row from the festival CSV, by column position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputRow {
    pub artist_name: String,
    pub time_range: String,
    pub genres: String,
    pub address: String,
}

impl InputRow {
    /// Build a row from a CSV record, or `None` when columns are missing.
    pub fn from_record(record: &StringRecord) -> Option<Self> {
        if record.len() < REQUIRED_FIELDS {
            return None;
        }
        Some(Self::from_record_lossy(record))
    }

    /// Build a row from a CSV record, leaving missing columns empty.
    pub fn from_record_lossy(record: &StringRecord) -> Self {
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        Self {
            artist_name: field(0),
            time_range: field(1),
            genres: field(2),
            address: field(3).trim().to_string(),
        }
    }

    pub fn genre_list(&self) -> Vec<String> {
        split_genres(&self.genres)
    }
}

/// Split a comma-separated genre cell, trimming entries and dropping empties.
pub fn split_genres(genres: &str) -> Vec<String> {
    genres
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("Rock, Jazz,  Blues "), ["Rock", "Jazz", "Blues"]);
        assert_eq!(split_genres(" , Folk,,"), ["Folk"]);
        assert!(split_genres("").is_empty());
    }

    #[test]
    fn test_from_record() {
        let record = StringRecord::from(vec![
            "The Porch Dogs",
            "2:00pm–3:00pm",
            "Rock, Blues",
            "  12 Elm St ",
            "extra",
        ]);
        let row = InputRow::from_record(&record).unwrap();

        assert_eq!(row.artist_name, "The Porch Dogs");
        assert_eq!(row.address, "12 Elm St");
        assert_eq!(row.genre_list(), ["Rock", "Blues"]);
    }

    #[test]
    fn test_short_record() {
        let record = StringRecord::from(vec!["Solo Act", "2:00pm–3:00pm"]);

        assert!(InputRow::from_record(&record).is_none());
        let row = InputRow::from_record_lossy(&record);
        assert_eq!(row.artist_name, "Solo Act");
        assert!(row.genres.is_empty());
        assert!(row.address.is_empty());
    }
}
