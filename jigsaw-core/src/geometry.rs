//! Irregular tiling of the unit square into interlocking octagonal pieces.
//!
//! All cut geometry lives in a single [`Lattice`]: corner points and edge
//! midpoints are generated once and every piece outline is read back out of
//! it, so two neighbours always see the very same points on their shared edge.

use geo::{Area, Contains, LineString, Polygon};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::Grid;

/// Range of the relative weights drawn for each row and column.
pub const WEIGHT_MIN: f64 = 0.6;
pub const WEIGHT_MAX: f64 = 2.4;

/// Corner jitter, as a fraction of the narrower cell next to the corner.
pub const CORNER_JITTER: f64 = 0.15;
/// Midpoint jitter, as a fraction of the cell extent along the jitter axis.
///
/// `CORNER_JITTER + MID_JITTER` must stay below 0.25: every outline point then
/// remains within a quarter cell of its nominal position, which keeps the
/// outlines simple.
pub const MID_JITTER: f64 = 0.08;

/// Number of points in a piece outline.
pub const OUTLINE_LEN: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn midpoint(a: Point, b: Point) -> Point {
        Point {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

/// Axis-aligned rectangle in unit-square coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Smallest rectangle containing every point.
    pub fn from_points(pts: &[Point]) -> Rect {
        if pts.is_empty() {
            return Rect::default();
        }
        let (mut minx, mut miny, mut maxx, mut maxy) = (
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for p in pts {
            minx = minx.min(p.x);
            miny = miny.min(p.y);
            maxx = maxx.max(p.x);
            maxy = maxy.max(p.y);
        }
        Rect {
            x: minx,
            y: miny,
            w: maxx - minx,
            h: maxy - miny,
        }
    }

    pub fn to_local(&self, p: Point) -> Point {
        Point {
            x: (p.x - self.x) / self.w,
            y: (p.y - self.y) / self.h,
        }
    }

    pub fn to_world(&self, p: Point) -> Point {
        Point {
            x: self.x + p.x * self.w,
            y: self.y + p.y * self.h,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Cut positions along one axis: `count + 1` increasing values from exactly
/// 0 to exactly 1, spaced by weights drawn from `WEIGHT_MIN..=WEIGHT_MAX`.
pub fn cut_positions<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f64> {
    let weights: Vec<f64> = (0..count)
        .map(|_| rng.random_range(WEIGHT_MIN..=WEIGHT_MAX))
        .collect();
    let sum: f64 = weights.iter().sum();
    let mut cuts = Vec::with_capacity(count + 1);
    cuts.push(0.0);
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w / sum;
        cuts.push(if i == count - 1 { 1.0 } else { acc });
    }
    cuts
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude <= 0.0 {
        return 0.0;
    }
    rng.random_range(-amplitude..=amplitude)
}

/// Shared corner and midpoint structure of a whole tiling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    grid: Grid,
    col_cuts: Vec<f64>,
    row_cuts: Vec<f64>,
    // (rows + 1) x (cols + 1), row-major
    corners: Vec<Point>,
    // one per cell on each horizontal line: (rows + 1) x cols
    h_mids: Vec<Point>,
    // one per cell on each vertical line: rows x (cols + 1)
    v_mids: Vec<Point>,
}

impl Lattice {
    pub fn build<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        let (rows, cols) = (grid.rows(), grid.cols());
        let col_cuts = cut_positions(cols, rng);
        let row_cuts = cut_positions(rows, rng);
        let col_w = |c: usize| col_cuts[c + 1] - col_cuts[c];
        let row_h = |r: usize| row_cuts[r + 1] - row_cuts[r];

        let mut corners = Vec::with_capacity((rows + 1) * (cols + 1));
        for r in 0..=rows {
            for c in 0..=cols {
                let mut x = col_cuts[c];
                let mut y = row_cuts[r];
                if c > 0 && c < cols {
                    x += jitter(rng, CORNER_JITTER * col_w(c - 1).min(col_w(c)));
                }
                if r > 0 && r < rows {
                    y += jitter(rng, CORNER_JITTER * row_h(r - 1).min(row_h(r)));
                }
                corners.push(Point { x, y });
            }
        }
        let corner = |r: usize, c: usize| corners[r * (cols + 1) + c];

        let mut h_mids = Vec::with_capacity((rows + 1) * cols);
        for r in 0..=rows {
            for c in 0..cols {
                let mid = Point::midpoint(corner(r, c), corner(r, c + 1));
                let across = if r > 0 && r < rows {
                    jitter(rng, MID_JITTER * row_h(r - 1).min(row_h(r)))
                } else {
                    0.0
                };
                h_mids.push(Point {
                    x: mid.x + jitter(rng, MID_JITTER * col_w(c)),
                    y: mid.y + across,
                });
            }
        }

        let mut v_mids = Vec::with_capacity(rows * (cols + 1));
        for r in 0..rows {
            for c in 0..=cols {
                let mid = Point::midpoint(corner(r, c), corner(r + 1, c));
                let across = if c > 0 && c < cols {
                    jitter(rng, MID_JITTER * col_w(c - 1).min(col_w(c)))
                } else {
                    0.0
                };
                v_mids.push(Point {
                    x: mid.x + across,
                    y: mid.y + jitter(rng, MID_JITTER * row_h(r)),
                });
            }
        }

        Self {
            grid,
            col_cuts,
            row_cuts,
            corners,
            h_mids,
            v_mids,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn col_cuts(&self) -> &[f64] {
        &self.col_cuts
    }

    pub fn row_cuts(&self) -> &[f64] {
        &self.row_cuts
    }

    /// Corner on horizontal line `row` (0..=rows) and vertical line `col` (0..=cols).
    pub fn corner(&self, row: usize, col: usize) -> Point {
        self.corners[row * (self.grid.cols() + 1) + col]
    }

    /// Midpoint of the edge on horizontal line `row` spanning column `col`.
    pub fn h_mid(&self, row: usize, col: usize) -> Point {
        self.h_mids[row * self.grid.cols() + col]
    }

    /// Midpoint of the edge on vertical line `col` spanning row `row`.
    pub fn v_mid(&self, row: usize, col: usize) -> Point {
        self.v_mids[row * (self.grid.cols() + 1) + col]
    }

    /// Clockwise outline of cell (`row`, `col`) in unit-square coordinates,
    /// starting at the top-left corner.
    pub fn outline(&self, row: usize, col: usize) -> [Point; OUTLINE_LEN] {
        [
            self.corner(row, col),
            self.h_mid(row, col),
            self.corner(row, col + 1),
            self.v_mid(row, col + 1),
            self.corner(row + 1, col + 1),
            self.h_mid(row + 1, col),
            self.corner(row + 1, col),
            self.v_mid(row, col),
        ]
    }

    pub fn pieces(&self) -> Vec<PieceShape> {
        let mut out = Vec::with_capacity(self.grid.piece_count());
        for r in 0..self.grid.rows() {
            for c in 0..self.grid.cols() {
                out.push(PieceShape::from_world(
                    self.grid.id_of(r, c),
                    self.outline(r, c),
                ));
            }
        }
        out
    }
}

/// Frozen shape of one piece.
///
/// `bounds` doubles as the image-sampling rectangle against the full source
/// image; `outline` lives in the bounds' own `[0,1]x[0,1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceShape {
    pub id: usize,
    pub correct_slot: usize,
    pub bounds: Rect,
    pub outline: [Point; OUTLINE_LEN],
}

impl PieceShape {
    fn from_world(id: usize, world: [Point; OUTLINE_LEN]) -> Self {
        let bounds = Rect::from_points(&world);
        Self {
            id,
            correct_slot: id,
            bounds,
            outline: world.map(|p| bounds.to_local(p)),
        }
    }

    pub fn world_outline(&self) -> [Point; OUTLINE_LEN] {
        self.outline.map(|p| self.bounds.to_world(p))
    }

    pub fn polygon(&self) -> Polygon<f64> {
        let ring: Vec<(f64, f64)> = self.world_outline().iter().map(|p| (p.x, p.y)).collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Area covered on the unit square.
    pub fn area(&self) -> f64 {
        self.polygon().unsigned_area()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p) && self.polygon().contains(&geo::Point::new(p.x, p.y))
    }

    pub fn is_simple(&self) -> bool {
        outline_is_simple(&self.outline)
    }
}

fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(a1, a2, b1);
    let d2 = cross(a1, a2, b2);
    let d3 = cross(b1, b2, a1);
    let d4 = cross(b1, b2, a2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// True when no two edges of the closed ring cross and no edge doubles back
/// over its predecessor.
pub fn outline_is_simple(pts: &[Point]) -> bool {
    let n = pts.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let here = pts[i];
        let next = pts[(i + 1) % n];
        let dot = (prev.x - here.x) * (next.x - here.x) + (prev.y - here.y) * (next.y - here.y);
        if cross(prev, here, next) == 0.0 && dot > 0.0 {
            return false;
        }
    }
    for i in 0..n {
        let (a1, a2) = (pts[i], pts[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_cross(a1, a2, pts[j], pts[(j + 1) % n]) {
                return false;
            }
        }
    }
    true
}

/// Partition the unit square for `grid`. Pieces come back in id order.
pub fn generate<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Vec<PieceShape> {
    let pieces = Lattice::build(grid, rng).pieces();
    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        pieces = pieces.len(),
        "generated tiling"
    );
    pieces
}

/// Piece arena of one session, indexed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tiling {
    grid: Grid,
    pieces: Vec<PieceShape>,
}

impl Tiling {
    pub fn generate<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        Self {
            grid,
            pieces: generate(grid, rng),
        }
    }

    pub fn from_lattice(lattice: &Lattice) -> Self {
        Self {
            grid: lattice.grid(),
            pieces: lattice.pieces(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn pieces(&self) -> &[PieceShape] {
        &self.pieces
    }

    pub fn get(&self, id: usize) -> Option<&PieceShape> {
        self.pieces.get(id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Slot whose outline contains a board point, if any. Points exactly on a
    /// cut line belong to no slot.
    pub fn slot_at(&self, p: Point) -> Option<usize> {
        self.pieces
            .iter()
            .find(|piece| piece.contains(p))
            .map(|piece| piece.correct_slot)
    }

    pub fn into_pieces(self) -> Vec<PieceShape> {
        self.pieces
    }
}
