use anyhow::{Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::Geocoder;
use crate::domain::{EnrichedEvent, EventRecord, InputRow, REQUIRED_FIELDS};
use crate::enrich::{EnrichStats, Enricher};
use crate::output::json::write_pretty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[longitude, latitude]`
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    /// Index of the source row in the input file (header = 0).
    pub id: usize,
    pub geometry: Geometry,
    pub properties: EventRecord,
}

impl Feature {
    pub fn new(id: usize, event: &EnrichedEvent) -> Self {
        Self {
            id,
            geometry: Geometry::Point {
                coordinates: event.position(),
            },
            properties: event.to_record(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Features numbered from 1, in event order.
    pub fn from_events(events: &[EnrichedEvent]) -> Self {
        Self {
            features: events
                .iter()
                .enumerate()
                .map(|(i, event)| Feature::new(i + 1, event))
                .collect(),
        }
    }
}

/// Enrich every data row of the listing into a feature.
///
/// Unlike the tabular writer, short rows are kept with empty fields so the
/// feature ids stay aligned with the input rows.
pub fn feature_collection<G: Geocoder>(
    records: &[StringRecord],
    enricher: &Enricher<G>,
) -> (FeatureCollection, EnrichStats) {
    let mut stats = EnrichStats::default();
    let mut features = Vec::new();

    for (i, record) in records.iter().enumerate().skip(1) {
        stats.rows += 1;
        if record.len() < REQUIRED_FIELDS {
            tracing::warn!(row = i, fields = record.len(), "Short row, filling empty fields");
        }

        let event = enricher.enrich(&InputRow::from_record_lossy(record));
        stats.record(&event);
        features.push(Feature::new(i, &event));
    }

    (FeatureCollection { features }, stats)
}

/// Write the collection as pretty-printed GeoJSON (2-space indent).
pub fn write_feature_collection(collection: &FeatureCollection, path: &Path) -> Result<()> {
    write_pretty(collection, path)
        .with_context(|| format!("Failed to write GeoJSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, EventLocation};
    use crate::enrich::tests::{FakeGeocoder, festival_clock};
    use crate::parse::TimeRange;
    use crate::source::table::read_records_from;

    fn located(name: &str, lat: f64, lon: f64) -> EnrichedEvent {
        EnrichedEvent {
            artist_name: name.to_string(),
            schedule: Some(TimeRange {
                start: 1_715_450_400_000,
                end: 1_715_454_000_000,
            }),
            genres: vec!["Rock".to_string()],
            location: EventLocation {
                address: "12 Elm St".to_string(),
                coordinates: Some(Coordinates { lat, lon }),
                map_link: Some(format!("https://maps.google.com/?q={},{}", lat, lon)),
            },
        }
    }

    #[test]
    fn test_feature_json_shape() {
        let feature = Feature::new(3, &located("Porch Dogs", 42.5, -71.25));
        let value = serde_json::to_value(&feature).unwrap();

        assert_eq!(value["type"], "Feature");
        assert_eq!(value["id"], 3);
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"][0], -71.25);
        assert_eq!(value["geometry"]["coordinates"][1], 42.5);
        assert_eq!(value["properties"]["artist_name"], "Porch Dogs");
        assert_eq!(value["properties"]["location"]["long"], -71.25);
    }

    #[test]
    fn test_geometry_matches_location() {
        let collection = FeatureCollection::from_events(&[
            located("A", 42.5, -71.25),
            EnrichedEvent::default(),
        ]);

        for feature in &collection.features {
            let Geometry::Point { coordinates } = feature.geometry;
            let location = &feature.properties.location;
            assert_eq!(coordinates, [location.long, location.lat]);
        }
        assert_eq!(
            collection.features[1].geometry,
            Geometry::Point {
                coordinates: [0.0, 0.0]
            }
        );
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.geojson");
        let events = [
            located("A", 42.1, -71.1),
            located("B", 42.2, -71.2),
            located("C", 42.3, -71.3),
        ];

        write_feature_collection(&FeatureCollection::from_events(&events), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"type\": \"FeatureCollection\""));
        let decoded: FeatureCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.features.len(), 3);
        for (feature, event) in decoded.features.iter().zip(&events) {
            assert_eq!(feature.geometry, Geometry::Point { coordinates: event.position() });
            assert_eq!(feature.properties.artist_name, event.artist_name);
        }
    }

    #[test]
    fn test_feature_collection_from_rows() {
        let input = "Name,Time,Genres,Address\n\
                     Porch Dogs,2:00pm–4:30pm,\"Rock, Jazz,  Blues \",12 Elm St\n\
                     Short Row\n\
                     Lost,2:00pm only,Folk,1 Nowhere Rd\n";
        let records = read_records_from(input.as_bytes()).unwrap();
        let enricher = Enricher::new(
            FakeGeocoder::with(&[("12 Elm St", "42.39", "-71.10")]),
            festival_clock(),
        );

        let (collection, stats) = feature_collection(&records, &enricher);

        assert_eq!(collection.features.len(), 3);
        let ids: Vec<_> = collection.features.iter().map(|f| f.id).collect();
        assert_eq!(ids, [1, 2, 3]);

        let first = &collection.features[0].properties;
        assert_eq!(first.genres, ["Rock", "Jazz", "Blues"]);
        assert_eq!(first.location.google_maps_link, "https://maps.google.com/?q=42.39,-71.10");
        assert!(first.start_time < first.end_time);

        let short = &collection.features[1].properties;
        assert_eq!(short.artist_name, "Short Row");
        assert_eq!((short.start_time, short.end_time), (0, 0));

        let lost = &collection.features[2];
        assert_eq!(lost.geometry, Geometry::Point { coordinates: [0.0, 0.0] });
        assert_eq!((lost.properties.start_time, lost.properties.end_time), (0, 0));

        assert_eq!(stats.rows, 3);
        assert_eq!(stats.unlocated, 2);
        assert_eq!(stats.unscheduled, 2);
    }
}
