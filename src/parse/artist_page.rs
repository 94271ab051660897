use anyhow::{Result, bail};

use super::html::{anchors, elements_with_class};
use crate::domain::{ArtistLink, ArtistProfile};

const ENTRY_SEGMENT: &str = "/entry/";

/// Entity id of a detail page URL: the path segment after `/entry/`.
pub fn entry_id(url: &str) -> Result<String> {
    let Some((_, rest)) = url.split_once(ENTRY_SEGMENT) else {
        bail!("Not an artist entry URL: {}", url);
    };
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if id.is_empty() {
        bail!("Artist entry URL has no id: {}", url);
    }
    Ok(id.to_string())
}

/// Extract the artist profile from a detail page.
///
/// * name: text of `.page-title`
/// * links: every anchor inside `.band-details`, spaces in URLs as `+`;
///   an anchor without `href` keeps an empty URL
/// * image: `src` of the last `.gv-image`
pub fn parse_artist_page(url: &str, html: &str) -> Result<ArtistProfile> {
    let id = entry_id(url)?;

    let name = elements_with_class(html, "page-title")
        .first()
        .map(|e| e.text())
        .unwrap_or_default();

    let links = elements_with_class(html, "band-details")
        .iter()
        .flat_map(|details| anchors(details.inner))
        .map(|anchor| ArtistLink {
            url: anchor.href.unwrap_or_default().replace(' ', "+"),
            text: anchor.text,
        })
        .collect();

    let img_url = elements_with_class(html, "gv-image")
        .iter()
        .filter_map(|e| e.attr("src"))
        .next_back()
        .unwrap_or_default();

    Ok(ArtistProfile {
        id,
        name,
        about: String::new(),
        links,
        img_url,
    })
}
