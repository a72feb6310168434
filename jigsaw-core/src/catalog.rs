use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const IMAGE_PROXY: &str = "https://images.weserv.nl/";
/// Shown in place of a piece whose image failed to load.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x400/1e293b/fbbf24?text=Piece";

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Artwork {
    pub id: &'static str,
    pub title: &'static str,
    pub artist: &'static str,
    pub year: &'static str,
    pub source_url: &'static str,
    pub description: &'static str,
}

impl Artwork {
    /// URL the pieces sample from: the source image routed through the proxy.
    pub fn image_url(&self) -> String {
        proxied_image_url(self.source_url)
    }
}

pub const DEFAULT_ARTWORK_ID: &str = "monalisa";

pub const ARTWORKS: &[Artwork] = &[Artwork {
    id: DEFAULT_ARTWORK_ID,
    title: "Mona Lisa",
    artist: "Leonardo da Vinci",
    year: "c. 1503–1506",
    source_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/e/ec/Mona_Lisa%2C_by_Leonardo_da_Vinci%2C_from_C2RMF_retouched.jpg/600px-Mona_Lisa%2C_by_Leonardo_da_Vinci%2C_from_C2RMF_retouched.jpg",
    description: "The world's most famous portrait.",
}];

pub fn artwork_by_id(id: &str) -> Option<&'static Artwork> {
    let trimmed = id.trim();
    ARTWORKS
        .iter()
        .find(|art| art.id.eq_ignore_ascii_case(trimmed))
}

pub fn default_artwork() -> &'static Artwork {
    &ARTWORKS[0]
}

/// Route an image through the resizing proxy so it is served CORS-clean and
/// capped at 1000px wide.
pub fn proxied_image_url(url: &str) -> String {
    format!(
        "{}?url={}&w=1000&fit=contain&output=jpg&q=85",
        IMAGE_PROXY,
        utf8_percent_encode(url, URI_COMPONENT)
    )
}
