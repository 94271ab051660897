use anyhow::{Context, Result};
use csv::{StringRecord, WriterBuilder};
use std::io::Write;
use std::path::Path;

use crate::api::Geocoder;
use crate::domain::{REQUIRED_FIELDS, map_link};
use crate::enrich::{EnrichStats, Enricher, resolved};

/// Columns appended to every row of the listing.
pub const APPENDED_COLUMNS: [&str; 3] = ["Latitude", "Longitude", "Google Maps Link"];

/// Write the listing back out with latitude, longitude and map link columns.
///
/// The first record is the header. Rows with fewer than the required
/// columns are dropped; rows that fail to geocode keep empty cells. The map
/// link is only filled when the returned coordinates parse.
pub fn write_tabular<G: Geocoder>(
    records: &[StringRecord],
    enricher: &Enricher<G>,
    path: &Path,
) -> Result<EnrichStats> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_tabular_to(records, enricher, file)
        .with_context(|| format!("Failed to write CSV: {}", path.display()))
}

pub fn write_tabular_to<G: Geocoder, W: Write>(
    records: &[StringRecord],
    enricher: &Enricher<G>,
    out: W,
) -> Result<EnrichStats> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);
    let mut stats = EnrichStats::default();

    let Some((header, rows)) = records.split_first() else {
        writer.flush()?;
        return Ok(stats);
    };

    let mut header = header.clone();
    header.extend(APPENDED_COLUMNS);
    writer.write_record(&header)?;

    for record in rows {
        stats.rows += 1;
        if record.len() < REQUIRED_FIELDS {
            stats.skipped += 1;
            continue;
        }

        if enricher.schedule(&record[0], &record[1]).is_none() {
            stats.unscheduled += 1;
        }

        let address = record[3].trim();
        let (lat, lon, link) = match enricher.locate(address) {
            Some(found) if resolved(address, &found).is_some() => {
                let link = map_link(&found.lat, &found.lon);
                (found.lat, found.lon, link)
            }
            Some(found) => {
                stats.unlocated += 1;
                (found.lat, found.lon, String::new())
            }
            None => {
                stats.unlocated += 1;
                Default::default()
            }
        };

        let mut row = record.clone();
        row.push_field(&lat);
        row.push_field(&lon);
        row.push_field(&link);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(stats)
}
