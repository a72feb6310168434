use jigsaw_core::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("SVG parse error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pixmap allocation failed for {0}x{1}")]
    Pixmap(u32, u32),

    #[error("unsupported output '{0}': expected .svg, .png or .json")]
    UnsupportedOutput(String),

    #[error("unknown artwork '{0}'; run `jigsaw artworks` for the list")]
    UnknownArtwork(String),
}
