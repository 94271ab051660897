use serde::{Deserialize, Serialize};

/// A labelled link from an artist's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistLink {
    pub text: String,
    pub url: String,
}

/// What the detail page says about one artist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub id: String,
    pub name: String,
    pub about: String,
    pub links: Vec<ArtistLink>,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
}

impl ArtistProfile {
    /// Name safe to use as a file stem.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        if stem.is_empty() { self.id.clone() } else { stem }
    }
}
