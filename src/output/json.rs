use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{ArtistProfile, EnrichedEvent, EventRecord};

/// Write any serializable value as pretty JSON with a trailing newline.
pub fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to encode JSON: {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Write the enriched listing as a plain JSON array of event records.
pub fn write_events(events: &[EnrichedEvent], path: &Path) -> Result<()> {
    let records: Vec<EventRecord> = events.iter().map(EnrichedEvent::to_record).collect();
    write_pretty(&records, path)
}

/// Save a profile as `<dir>/<id>/<name>.json`, creating the entity directory.
pub fn write_artist_profile(dir: &Path, profile: &ArtistProfile) -> Result<PathBuf> {
    let entity_dir = dir.join(&profile.id);
    fs::create_dir_all(&entity_dir)
        .with_context(|| format!("Failed to create directory: {}", entity_dir.display()))?;

    let path = entity_dir.join(format!("{}.json", profile.file_stem()));
    write_pretty(profile, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtistLink;

    #[test]
    fn test_write_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artists.json");
        let events = vec![
            EnrichedEvent {
                artist_name: "A".to_string(),
                ..Default::default()
            },
            EnrichedEvent {
                artist_name: "B".to_string(),
                ..Default::default()
            },
        ];

        write_events(&events, &path).unwrap();

        let decoded: Vec<EventRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].artist_name, "A");
        assert_eq!(decoded[1].location.lat, 0.0);
    }

    #[test]
    fn test_write_artist_profile() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ArtistProfile {
            id: "846".to_string(),
            name: "The Porch Dogs".to_string(),
            links: vec![ArtistLink {
                text: "Website".to_string(),
                url: "https://example.org".to_string(),
            }],
            ..Default::default()
        };

        let path = write_artist_profile(dir.path(), &profile).unwrap();

        assert_eq!(path, dir.path().join("846").join("The Porch Dogs.json"));
        let decoded: ArtistProfile =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(decoded, profile);
    }
}
