use jigsaw_core::catalog::PLACEHOLDER_IMAGE_URL;
use jigsaw_core::{Location, PieceShape, Point, Rect, Session};
use png::{BitDepth, ColorType, Encoder};
use serde::Serialize;

/// View box every clip path is expressed in.
pub const PIECE_VIEW_BOX: &str = "0 0 1 1";

pub fn outline_color(i: usize) -> &'static str {
    // Fixed 12-color palette; cycles by index for larger boards.
    const PALETTE: [&str; 12] = [
        "#e11d48", // rose
        "#ea580c", // orange
        "#d97706", // amber
        "#65a30d", // lime
        "#059669", // emerald
        "#0891b2", // cyan
        "#2563eb", // blue
        "#7c3aed", // violet
        "#c026d3", // fuchsia
        "#db2777", // pink
        "#78716c", // stone
        "#475569", // slate
    ];
    PALETTE[i % PALETTE.len()]
}

fn path_from_points<F>(pts: &[Point], to_px: &F) -> String
where
    F: Fn(Point) -> (f64, f64),
{
    if pts.is_empty() {
        return String::new();
    }
    let (x0, y0) = to_px(pts[0]);
    let mut out = format!("M {:.4} {:.4}", x0, y0);
    for p in &pts[1..] {
        let (x, y) = to_px(*p);
        out.push_str(&format!(" L {:.4} {:.4}", x, y));
    }
    out.push_str(" Z");
    out
}

/// Path data of a piece outline in its own `0 0 1 1` box, for use with
/// `clipPathUnits="objectBoundingBox"`.
pub fn clip_path_d(piece: &PieceShape) -> String {
    path_from_points(&piece.outline, &|p: Point| (p.x, p.y))
}

/// Hidden `<svg>` holding one `clip-{id}` clip path per piece.
pub fn clip_path_defs(pieces: &[PieceShape]) -> String {
    let mut s = String::from("<svg width=\"0\" height=\"0\" aria-hidden=\"true\"><defs>\n");
    for p in pieces {
        s.push_str(&format!(
            "<clipPath id=\"clip-{}\" clipPathUnits=\"objectBoundingBox\"><path d=\"{}\"/></clipPath>\n",
            p.id,
            clip_path_d(p)
        ));
    }
    s.push_str("</defs></svg>\n");
    s
}

/// Everything a web renderer needs to draw one piece: the clip outline plus
/// the rectangle of the source image it shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceSprite {
    pub id: usize,
    pub correct_index: usize,
    pub image_url: String,
    /// Shown instead when `image_url` fails to load.
    pub fallback_url: &'static str,
    pub bg_pos: Rect,
    pub clip_path: String,
    pub view_box: &'static str,
}

pub fn sprites(pieces: &[PieceShape], image_url: &str) -> Vec<PieceSprite> {
    pieces
        .iter()
        .map(|p| PieceSprite {
            id: p.id,
            correct_index: p.correct_slot,
            image_url: image_url.to_string(),
            fallback_url: PLACEHOLDER_IMAGE_URL,
            bg_pos: p.bounds,
            clip_path: clip_path_d(p),
            view_box: PIECE_VIEW_BOX,
        })
        .collect()
}

pub fn manifest_json(pieces: &[PieceShape], image_url: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&sprites(pieces, image_url))
}

/// Per-slot highlighting for [`build_board_svg`].
#[derive(Clone, Debug, Default)]
pub struct BoardMarks {
    pub placed: Vec<bool>,
    pub selected: Option<usize>,
    pub mismatch: Option<usize>,
}

impl BoardMarks {
    pub fn from_session(session: &Session) -> Self {
        let placed = (0..session.pieces().len())
            .map(|id| matches!(session.location(id), Some(Location::Placed(_))))
            .collect();
        Self {
            placed,
            selected: session.selected(),
            mismatch: session.mismatch().map(|m| m.slot),
        }
    }

    fn is_placed(&self, slot: usize) -> bool {
        self.placed.get(slot).copied().unwrap_or(false)
    }
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Board preview: every slot outline drawn over a `width_px` x `height_px`
/// canvas. Placed slots are filled with their palette color, the mismatch
/// slot is tinted red and the selected piece's slot is outlined in amber.
pub fn build_board_svg(
    pieces: &[PieceShape],
    width_px: u32,
    height_px: u32,
    marks: &BoardMarks,
    title: Option<&str>,
) -> String {
    let (w, h) = (width_px as f64, height_px as f64);
    let to_px = |p: Point| (p.x * w, p.y * h);
    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\" stroke-linejoin=\"round\">\n",
        width_px, height_px
    ));
    if let Some(t) = title {
        s.push_str(&format!("<title>{}</title>\n", svg_escape(t)));
    }
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#0f172a\"/>\n");
    for piece in pieces {
        let slot = piece.correct_slot;
        let fill = if marks.is_placed(slot) {
            format!("fill=\"{}\" fill-opacity=\"0.6\"", outline_color(piece.id))
        } else if marks.mismatch == Some(slot) {
            "fill=\"#ef4444\" fill-opacity=\"0.35\"".to_string()
        } else {
            "fill=\"none\"".to_string()
        };
        let stroke = if marks.selected == Some(piece.id) {
            "stroke=\"#f59e0b\" stroke-width=\"3\""
        } else {
            "stroke=\"#cbd5e1\" stroke-width=\"1.5\""
        };
        s.push_str(&format!(
            "<path id=\"slot-{}\" d=\"{}\" {} {}/>\n",
            slot,
            path_from_points(&piece.world_outline(), &to_px),
            fill,
            stroke
        ));
    }
    s.push_str("</svg>\n");
    s
}

// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input)
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
    }
    Ok(buf)
}
