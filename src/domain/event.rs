use serde::{Deserialize, Serialize};

use crate::parse::TimeRange;

/// Build the map link for a geocoded position.
///
/// The latitude and longitude are embedded verbatim, exactly as the
/// geocoding service returned them.
pub fn map_link(lat: &str, lon: &str) -> String {
    format!("https://maps.google.com/?q={},{}", lat, lon)
}

/// A resolved WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventLocation {
    pub address: String,
    /// `None` when the address could not be geocoded.
    pub coordinates: Option<Coordinates>,
    pub map_link: Option<String>,
}

/// A listing row after geocoding and time parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnrichedEvent {
    pub artist_name: String,
    /// `None` when the time range could not be parsed.
    pub schedule: Option<TimeRange>,
    pub genres: Vec<String>,
    pub location: EventLocation,
}

impl EnrichedEvent {
    pub fn is_located(&self) -> bool {
        self.location.coordinates.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// The `[lon, lat]` pair used for both the geometry and the location
    /// record; `[0, 0]` when unresolved.
    pub fn position(&self) -> [f64; 2] {
        self.location
            .coordinates
            .map(|c| [c.lon, c.lat])
            .unwrap_or([0.0, 0.0])
    }

    pub fn to_record(&self) -> EventRecord {
        let [long, lat] = self.position();
        let (start_time, end_time) = self
            .schedule
            .map(|s| (s.start, s.end))
            .unwrap_or((0, 0));

        EventRecord {
            artist_name: self.artist_name.clone(),
            start_time,
            end_time,
            genres: self.genres.clone(),
            location: LocationRecord {
                lat,
                long,
                address: self.location.address.clone(),
                google_maps_link: self.location.map_link.clone().unwrap_or_default(),
            },
        }
    }
}

/// Wire form of an [`EnrichedEvent`], as read by the map frontend.
///
/// Unresolved times and positions are written as zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub artist_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub genres: Vec<String>,
    pub location: LocationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub lat: f64,
    pub long: f64,
    pub address: String,
    pub google_maps_link: String,
}
