use std::fmt;

use crate::api::{GeocodeResult, Geocoder};
use crate::domain::{Coordinates, EnrichedEvent, EventLocation, InputRow, map_link};
use crate::parse::{EventClock, TimeRange, TimeRangeError};
use crate::source::ListingEntry;

/// Counts gathered while enriching a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Data rows read, header excluded.
    pub rows: usize,
    /// Rows dropped for missing columns.
    pub skipped: usize,
    /// Rows whose address did not resolve to coordinates.
    pub unlocated: usize,
    /// Rows whose time range did not parse.
    pub unscheduled: usize,
}

impl EnrichStats {
    pub fn record(&mut self, event: &EnrichedEvent) {
        if !event.is_located() {
            self.unlocated += 1;
        }
        if !event.is_scheduled() {
            self.unscheduled += 1;
        }
    }
}

impl fmt::Display for EnrichStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows ({} skipped, {} without coordinates, {} without times)",
            self.rows, self.skipped, self.unlocated, self.unscheduled
        )
    }
}

/// Turns listing rows into [`EnrichedEvent`]s.
///
/// Every lookup is best effort: failures are logged and leave the affected
/// field unset, so one bad row never stops the rest.
pub struct Enricher<G> {
    geocoder: G,
    clock: EventClock,
}

impl<G: Geocoder> Enricher<G> {
    pub fn new(geocoder: G, clock: EventClock) -> Self {
        Self { geocoder, clock }
    }

    /// Geocode an address, logging instead of failing.
    pub fn locate(&self, address: &str) -> Option<GeocodeResult> {
        if address.trim().is_empty() {
            tracing::warn!("Empty address, skipping geocoding");
            return None;
        }

        match self.geocoder.geocode(address) {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                tracing::warn!(address, "No geocoding results");
                None
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "Geocoding failed");
                None
            }
        }
    }

    /// Parse a row's time range, logging instead of failing.
    pub fn schedule(&self, artist: &str, time_range: &str) -> Option<TimeRange> {
        scheduled(artist, self.clock.parse_range(time_range))
    }

    pub fn enrich(&self, row: &InputRow) -> EnrichedEvent {
        EnrichedEvent {
            artist_name: row.artist_name.clone(),
            schedule: self.schedule(&row.artist_name, &row.time_range),
            genres: row.genre_list(),
            location: self.place(&row.address, None),
        }
    }

    /// Enrich an entry from the raw site table, keeping the site's own map
    /// link when it has one.
    pub fn enrich_listing(&self, entry: &ListingEntry) -> EnrichedEvent {
        let schedule = scheduled(
            &entry.artist_name,
            self.clock.parse_pair(&entry.start, &entry.end),
        );

        EnrichedEvent {
            artist_name: entry.artist_name.clone(),
            schedule,
            genres: entry.genres.clone(),
            location: self.place(&entry.address, entry.map_href.clone()),
        }
    }

    fn place(&self, address: &str, site_link: Option<String>) -> EventLocation {
        let address = address.trim();
        let found = self.locate(address);

        let coordinates = found.as_ref().and_then(|r| resolved(address, r));
        let map_link = site_link.or_else(|| {
            let found = found.filter(|_| coordinates.is_some())?;
            Some(map_link(&found.lat, &found.lon))
        });

        EventLocation {
            address: address.to_string(),
            coordinates,
            map_link,
        }
    }
}

/// Coordinates of a geocode result; unparseable strings are logged.
pub(crate) fn resolved(address: &str, found: &GeocodeResult) -> Option<Coordinates> {
    let coords = found.coordinates();
    if coords.is_none() {
        tracing::warn!(address, lat = %found.lat, lon = %found.lon, "Unparseable coordinates");
    }
    coords
}

fn scheduled(artist: &str, parsed: Result<TimeRange, TimeRangeError>) -> Option<TimeRange> {
    match parsed {
        Ok(range) => Some(range),
        Err(e) => {
            tracing::warn!(artist, error = %e, "Unparseable time range");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::GeocodeError;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Geocoder answering from a fixed table; unknown addresses find nothing,
    /// addresses containing "offline" fail.
    #[derive(Default)]
    pub(crate) struct FakeGeocoder {
        pub answers: HashMap<String, (String, String)>,
        pub queries: RefCell<Vec<String>>,
    }

    impl FakeGeocoder {
        pub(crate) fn with(entries: &[(&str, &str, &str)]) -> Self {
            Self {
                answers: entries
                    .iter()
                    .map(|(a, lat, lon)| (a.to_string(), (lat.to_string(), lon.to_string())))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl Geocoder for FakeGeocoder {
        fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
            self.queries.borrow_mut().push(address.to_string());
            if address.contains("offline") {
                return Err(GeocodeError::Status(reqwest::StatusCode::BAD_GATEWAY));
            }
            Ok(self.answers.get(address).map(|(lat, lon)| GeocodeResult {
                lat: lat.clone(),
                lon: lon.clone(),
            }))
        }
    }

    pub(crate) fn festival_clock() -> EventClock {
        EventClock::new(NaiveDate::from_ymd_opt(2024, 5, 11).unwrap(), New_York)
    }

    fn row(name: &str, time: &str, genres: &str, address: &str) -> InputRow {
        InputRow {
            artist_name: name.to_string(),
            time_range: time.to_string(),
            genres: genres.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn test_enrich_resolved_row() {
        let geocoder = FakeGeocoder::with(&[("12 Elm St", "42.3876", "-71.0995")]);
        let enricher = Enricher::new(geocoder, festival_clock());

        let event = enricher.enrich(&row(
            "Porch Dogs",
            "2:00pm–4:30pm",
            "Rock, Jazz,  Blues ",
            " 12 Elm St ",
        ));

        assert_eq!(event.artist_name, "Porch Dogs");
        assert_eq!(event.genres, ["Rock", "Jazz", "Blues"]);
        assert_eq!(event.location.address, "12 Elm St");
        let coords = event.location.coordinates.unwrap();
        assert_eq!((coords.lat, coords.lon), (42.3876, -71.0995));
        assert_eq!(
            event.location.map_link.as_deref(),
            Some("https://maps.google.com/?q=42.3876,-71.0995")
        );
        let schedule = event.schedule.unwrap();
        assert!(schedule.start < schedule.end);
    }

    #[test]
    fn test_enrich_unresolved_row() {
        let enricher = Enricher::new(FakeGeocoder::default(), festival_clock());

        let event = enricher.enrich(&row("Quiet", "2:00pm only", "", "1 Nowhere Rd"));

        assert!(event.location.coordinates.is_none());
        assert!(event.location.map_link.is_none());
        assert!(event.schedule.is_none());
        assert!(event.genres.is_empty());
        assert_eq!(event.to_record().start_time, 0);
    }

    #[test]
    fn test_geocoder_failure_is_not_fatal() {
        let geocoder = FakeGeocoder::with(&[("2 Oak St", "42.1", "-71.1")]);
        let enricher = Enricher::new(geocoder, festival_clock());

        let failed = enricher.enrich(&row("A", "1:00pm–2:00pm", "", "offline lane"));
        let next = enricher.enrich(&row("B", "1:00pm–2:00pm", "", "2 Oak St"));

        assert!(!failed.is_located());
        assert!(next.is_located());
    }

    #[test]
    fn test_empty_address_skips_lookup() {
        let enricher = Enricher::new(FakeGeocoder::default(), festival_clock());

        assert!(enricher.locate("  ").is_none());
        assert!(enricher.geocoder.queries.borrow().is_empty());
    }

    #[test]
    fn test_unparseable_coordinates_have_no_link() {
        let geocoder = FakeGeocoder::with(&[("12 Elm St", "n/a", "-71.0")]);
        let enricher = Enricher::new(geocoder, festival_clock());

        let event = enricher.enrich(&row("A", "", "", "12 Elm St"));

        assert!(event.location.coordinates.is_none());
        assert!(event.location.map_link.is_none());
        assert_eq!(event.position(), [0.0, 0.0]);
        assert_eq!(event.to_record().location.google_maps_link, "");
    }

    #[test]
    fn test_enrich_listing_prefers_site_link() {
        let geocoder = FakeGeocoder::with(&[("12 Elm St", "42.3876", "-71.0995")]);
        let enricher = Enricher::new(geocoder, festival_clock());
        let entry = ListingEntry {
            artist_name: "Porch Dogs".to_string(),
            start: "2:00pm".to_string(),
            end: "3:00pm".to_string(),
            genres: vec!["Rock".to_string()],
            address: "12 Elm St".to_string(),
            map_href: Some("https://maps.google.com/?q=12+Elm+St".to_string()),
        };

        let event = enricher.enrich_listing(&entry);

        assert!(event.is_located());
        assert!(event.is_scheduled());
        assert_eq!(
            event.location.map_link.as_deref(),
            Some("https://maps.google.com/?q=12+Elm+St")
        );
    }

    #[test]
    fn test_stats() {
        let enricher = Enricher::new(
            FakeGeocoder::with(&[("12 Elm St", "1", "2")]),
            festival_clock(),
        );
        let mut stats = EnrichStats::default();
        stats.record(&enricher.enrich(&row("A", "1:00pm–2:00pm", "", "12 Elm St")));
        stats.record(&enricher.enrich(&row("B", "bad", "", "elsewhere")));

        assert_eq!(stats.unlocated, 1);
        assert_eq!(stats.unscheduled, 1);
    }
}
