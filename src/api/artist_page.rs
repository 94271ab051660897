use anyhow::{Context, Result, bail};
use reqwest::header::CONTENT_TYPE;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ArtistProfile;
use crate::parse::parse_artist_page;

const USER_AGENT: &str = concat!("porchmap/", env!("CARGO_PKG_VERSION"));

/// File extension for an image content type, `None` for anything else.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpeg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Fetches artist detail pages and their images, one request at a time.
pub struct ArtistPageClient {
    client: reqwest::blocking::Client,
}

impl ArtistPageClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub fn fetch_profile(&self, url: &str) -> Result<ArtistProfile> {
        tracing::info!(url, "Visiting");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            bail!("{} returned status {}", url, response.status());
        }

        let html = response
            .text()
            .with_context(|| format!("Failed to read page body: {}", url))?;
        parse_artist_page(url, &html)
    }

    /// Download the profile's image into `<dir>/<id>/<name>.<ext>`.
    ///
    /// Returns `Ok(None)` when the profile has no image or the response is
    /// not a supported image type.
    pub fn download_image(&self, dir: &Path, profile: &ArtistProfile) -> Result<Option<PathBuf>> {
        if profile.img_url.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(&profile.img_url)
            .send()
            .with_context(|| format!("Failed to fetch image {}", profile.img_url))?;

        if !response.status().is_success() {
            bail!("{} returned status {}", profile.img_url, response.status());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let Some(ext) = image_extension(&content_type) else {
            tracing::warn!(url = %profile.img_url, %content_type, "Not a supported image, skipping");
            return Ok(None);
        };

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read image body: {}", profile.img_url))?;

        let entity_dir = dir.join(&profile.id);
        fs::create_dir_all(&entity_dir)
            .with_context(|| format!("Failed to create directory: {}", entity_dir.display()))?;
        let path = entity_dir.join(format!("{}.{}", profile.file_stem(), ext));
        fs::write(&path, &bytes)
            .with_context(|| format!("Failed to save image: {}", path.display()))?;

        Ok(Some(path))
    }
}
