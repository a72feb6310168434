use std::path::Path;

use jigsaw_core::{Artwork, PieceShape};
use jigsaw_svg::{BoardMarks, build_board_svg, encode_rgba_to_png_bytes, manifest_json};
use tracing::info;

use crate::error::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Svg,
    Png,
    Json,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png") => Ok(Self::Png),
            Some("json") => Ok(Self::Json),
            _ => Err(CliError::UnsupportedOutput(path.display().to_string())),
        }
    }
}

pub fn svg_to_png(svg: &str, width: u32, height: u32) -> Result<Vec<u8>, CliError> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(CliError::Pixmap(width, height))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    Ok(encode_rgba_to_png_bytes(width, height, pixmap.data())?)
}

/// Bytes of a freshly cut board in the format `out` asks for.
pub fn render_cut(
    pieces: &[PieceShape],
    artwork: &Artwork,
    out: &Path,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CliError> {
    let kind = OutputKind::from_path(out)?;
    let marks = BoardMarks::default();
    let bytes = match kind {
        OutputKind::Json => manifest_json(pieces, &artwork.image_url())?.into_bytes(),
        OutputKind::Svg => {
            build_board_svg(pieces, width, height, &marks, Some(artwork.title)).into_bytes()
        }
        OutputKind::Png => {
            let svg = build_board_svg(pieces, width, height, &marks, None);
            svg_to_png(&svg, width, height)?
        }
    };
    info!(?kind, pieces = pieces.len(), "rendered board");
    Ok(bytes)
}
