use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::domain::split_genres;
use crate::parse::parse_anchor;
use crate::parse::html::strip_tags;

/// Cells per row in the scraped listing table.
const RAW_CELLS: usize = 5;

/// The listing table as dumped from the festival site: one array of HTML
/// cells per performance.
#[derive(Debug, Deserialize)]
pub struct RawTable {
    pub data: Vec<Vec<String>>,
}

/// One performance from the raw table, with the markup peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub artist_name: String,
    pub start: String,
    pub end: String,
    pub genres: Vec<String>,
    pub address: String,
    /// Map link the site already attached to the address.
    pub map_href: Option<String>,
}

impl ListingEntry {
    /// Cells: name anchor, `"2:00pm &ndash;"`, end time, genres, address anchor.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() < RAW_CELLS {
            return None;
        }

        let name = parse_anchor(&cells[0]);
        let address = parse_anchor(&cells[4]);

        // The start cell carries the dash that joins it to the end cell.
        let start = cells[1].split('&').next().unwrap_or_default();

        Some(Self {
            artist_name: name.map(|a| a.text).unwrap_or_default(),
            start: strip_tags(start),
            end: strip_tags(&cells[2]),
            genres: split_genres(&strip_tags(&cells[3])),
            address: address.as_ref().map(|a| a.text.clone()).unwrap_or_default(),
            map_href: address.and_then(|a| a.href),
        })
    }
}

pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read raw table: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse raw table JSON: {}", path.display()))
}
