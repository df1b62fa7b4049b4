//! GeoKernel: the only place that knows how cell geometry is derived.
//!
//! Everything is planar and in the project CRS. Callers pass centroids and
//! the grid cell size; this module returns `geo` types and their WKT text.

use std::collections::HashMap;

use ::geo::{Centroid, Coord, LineString, MultiLineString, Point, Polygon};
use wkt::{ToWkt, TryFromWkt};

use crate::{CodecError, CodecResult};

/// Octagon factor used by the compass mapping (`1 + sqrt(2)` rounded as FLO-2D does).
pub const OCTAGON_FACTOR: f64 = 2.414;

/// Compass direction codes 1..8 shared by levees, streets and gutters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    N = 1,
    E = 2,
    S = 3,
    W = 4,
    NE = 5,
    SE = 6,
    SW = 7,
    NW = 8,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::E,
        Direction::S,
        Direction::W,
        Direction::NE,
        Direction::SE,
        Direction::SW,
        Direction::NW,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Direction::N),
            2 => Some(Direction::E),
            3 => Some(Direction::S),
            4 => Some(Direction::W),
            5 => Some(Direction::NE),
            6 => Some(Direction::SE),
            7 => Some(Direction::SW),
            8 => Some(Direction::NW),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Lattice step `(dx, dy)` towards the neighbouring cell.
    pub fn step(self) -> (i64, i64) {
        match self {
            Direction::N => (0, 1),
            Direction::E => (1, 0),
            Direction::S => (0, -1),
            Direction::W => (-1, 0),
            Direction::NE => (1, 1),
            Direction::SE => (1, -1),
            Direction::SW => (-1, -1),
            Direction::NW => (-1, 1),
        }
    }
}

/// Axis-aligned square of the given side centred on `(x, y)`.
pub fn square(x: f64, y: f64, side: f64) -> Polygon<f64> {
    let h = side * 0.5;
    Polygon::new(
        LineString::from(vec![
            (x - h, y - h),
            (x + h, y - h),
            (x + h, y + h),
            (x - h, y + h),
            (x - h, y - h),
        ]),
        vec![],
    )
}

/// Square-capped buffer of a single point.
pub fn buffer_point(x: f64, y: f64, radius: f64) -> Polygon<f64> {
    square(x, y, radius * 2.0)
}

/// Short directional segment on the cell octagon (levee and gutter glyph).
pub fn compass_segment(x: f64, y: f64, cell_size: f64, dir: Direction) -> LineString<f64> {
    let s = cell_size;
    let t = s / OCTAGON_FACTOR;
    let ((x1, y1), (x2, y2)) = match dir {
        Direction::N => ((x - t, y + s), (x + t, y + s)),
        Direction::E => ((x + s, y + t), (x + s, y - t)),
        Direction::S => ((x + t, y - s), (x - t, y - s)),
        Direction::W => ((x - s, y - t), (x - s, y + t)),
        Direction::NE => ((x + t, y + s), (x + s, y + t)),
        Direction::SE => ((x + s, y - t), (x + t, y - s)),
        Direction::SW => ((x - t, y - s), (x - s, y - t)),
        Direction::NW => ((x - s, y + t), (x - t, y + s)),
    };
    LineString::from(vec![(x1, y1), (x2, y2)])
}

/// Street glyph: one spoke from the centroid to the middle of each wing's compass segment.
pub fn street_glyph(x: f64, y: f64, cell_size: f64, dirs: &[Direction]) -> MultiLineString<f64> {
    let spokes = dirs
        .iter()
        .map(|&dir| {
            let seg = compass_segment(x, y, cell_size, dir);
            let mid = midpoint(&seg);
            LineString::from(vec![(x, y), (mid.x, mid.y)])
        })
        .collect();
    MultiLineString::new(spokes)
}

/// Multi-line made of the compass segments of every direction given.
pub fn compass_multiline(
    x: f64,
    y: f64,
    cell_size: f64,
    dirs: &[Direction],
) -> MultiLineString<f64> {
    MultiLineString::new(
        dirs.iter()
            .map(|&dir| compass_segment(x, y, cell_size, dir))
            .collect(),
    )
}

/// Polyline through the given vertices. A single vertex yields a zero-length line.
pub fn polyline(points: &[(f64, f64)]) -> LineString<f64> {
    match points {
        [] => LineString::new(vec![]),
        [only] => LineString::from(vec![*only, *only]),
        _ => LineString::from(points.to_vec()),
    }
}

pub fn point(x: f64, y: f64) -> Point<f64> {
    Point::new(x, y)
}

/// Centroid of a polygon; axis-aligned squares resolve to their bounding-box middle.
pub fn centroid(poly: &Polygon<f64>) -> Option<(f64, f64)> {
    let coords: Vec<Coord<f64>> = poly.exterior().coords().copied().collect();
    if coords.is_empty() {
        return None;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in &coords {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    let axis_aligned = coords
        .iter()
        .all(|c| (c.x == min_x || c.x == max_x) && (c.y == min_y || c.y == max_y));
    if axis_aligned {
        return Some(((min_x + max_x) * 0.5, (min_y + max_y) * 0.5));
    }
    poly.centroid().map(|p| (p.x(), p.y()))
}

fn midpoint(line: &LineString<f64>) -> Coord<f64> {
    let coords = &line.0;
    match (coords.first(), coords.last()) {
        (Some(a), Some(b)) => Coord {
            x: (a.x + b.x) * 0.5,
            y: (a.y + b.y) * 0.5,
        },
        _ => Coord { x: 0.0, y: 0.0 },
    }
}

/// Smallest positive spacing between sorted unique x coordinates, falling back to y.
pub fn cell_size_from_centroids(xs: &[f64], ys: &[f64]) -> Option<f64> {
    min_positive_diff(xs).or_else(|| min_positive_diff(ys))
}

fn min_positive_diff(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .min_by(f64::total_cmp)
}

/// Neighbour ids in the order N, E, S, W, NE, SE, SW, NW (0 where absent).
///
/// `cells` holds `(fid, x, y)` centroids; ids are looked up on the lattice implied by `cell_size`.
pub fn neighbours(cells: &[(i64, f64, f64)], cell_size: f64) -> CodecResult<Vec<(i64, [i64; 8])>> {
    if !(cell_size > 0.0) {
        return Err(CodecError::domain(format!(
            "cell size must be positive, got {}",
            cell_size
        )));
    }
    if cells.is_empty() {
        return Ok(Vec::new());
    }
    let min_x = cells.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let min_y = cells.iter().map(|c| c.2).fold(f64::INFINITY, f64::min);
    let key = |x: f64, y: f64| {
        (
            ((x - min_x) / cell_size).round() as i64,
            ((y - min_y) / cell_size).round() as i64,
        )
    };
    let lattice: HashMap<(i64, i64), i64> =
        cells.iter().map(|&(fid, x, y)| (key(x, y), fid)).collect();

    Ok(cells
        .iter()
        .map(|&(fid, x, y)| {
            let (i, j) = key(x, y);
            let mut ids = [0_i64; 8];
            for (slot, dir) in Direction::ALL.iter().enumerate() {
                let (dx, dy) = dir.step();
                ids[slot] = lattice.get(&(i + dx, j + dy)).copied().unwrap_or(0);
            }
            (fid, ids)
        })
        .collect())
}

pub fn polygon_wkt(poly: &Polygon<f64>) -> String {
    poly.wkt_string()
}

pub fn line_wkt(line: &LineString<f64>) -> String {
    line.wkt_string()
}

pub fn multiline_wkt(lines: &MultiLineString<f64>) -> String {
    lines.wkt_string()
}

pub fn point_wkt(p: &Point<f64>) -> String {
    p.wkt_string()
}

pub fn polygon_from_wkt(text: &str) -> CodecResult<Polygon<f64>> {
    Polygon::<f64>::try_from_wkt_str(text)
        .map_err(|e| CodecError::domain(format!("invalid polygon WKT '{}': {}", text, e)))
}

pub fn line_from_wkt(text: &str) -> CodecResult<LineString<f64>> {
    LineString::<f64>::try_from_wkt_str(text)
        .map_err(|e| CodecError::domain(format!("invalid linestring WKT '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_axis_aligned_with_given_side() {
        let sq = square(100.0, 200.0, 50.0);
        let ext: Vec<_> = sq.exterior().coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(ext[0], (75.0, 175.0));
        assert_eq!(ext[2], (125.0, 225.0));
        assert_eq!(centroid(&sq), Some((100.0, 200.0)));
    }

    #[test]
    fn compass_north_segment_matches_table() {
        let seg = compass_segment(0.0, 0.0, 10.0, Direction::N);
        let t = 10.0 / OCTAGON_FACTOR;
        assert_eq!(seg.0[0].x, -t);
        assert_eq!(seg.0[0].y, 10.0);
        assert_eq!(seg.0[1].x, t);
        assert_eq!(seg.0[1].y, 10.0);
    }

    #[test]
    fn compass_southwest_segment_matches_table() {
        let seg = compass_segment(5.0, 5.0, 10.0, Direction::SW);
        let t = 10.0 / OCTAGON_FACTOR;
        assert_eq!((seg.0[0].x, seg.0[0].y), (5.0 - t, -5.0));
        assert_eq!((seg.0[1].x, seg.0[1].y), (-5.0, 5.0 - t));
    }

    #[test]
    fn direction_codes_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(9), None);
    }

    #[test]
    fn cell_size_prefers_x_then_y() {
        assert_eq!(
            cell_size_from_centroids(&[0.0, 100.0, 0.0, 100.0], &[0.0, 0.0, 100.0, 100.0]),
            Some(100.0)
        );
        assert_eq!(
            cell_size_from_centroids(&[5.0, 5.0, 5.0], &[0.0, 30.0, 60.0]),
            Some(30.0)
        );
        assert_eq!(cell_size_from_centroids(&[1.0], &[1.0]), None);
    }

    #[test]
    fn neighbours_on_two_by_two_grid() {
        let cells = [
            (1, 0.0, 0.0),
            (2, 100.0, 0.0),
            (3, 0.0, 100.0),
            (4, 100.0, 100.0),
        ];
        let n = neighbours(&cells, 100.0).unwrap();
        // cell 1: N=3, E=2, NE=4
        assert_eq!(n[0].1, [3, 2, 0, 0, 4, 0, 0, 0]);
        // cell 4: S=2, W=3, SW=1
        assert_eq!(n[3].1, [0, 0, 2, 3, 0, 0, 1, 0]);
    }

    #[test]
    fn polygon_wkt_round_trips() {
        let sq = square(10.5, -3.25, 2.0);
        let text = polygon_wkt(&sq);
        let back = polygon_from_wkt(&text).unwrap();
        assert_eq!(sq, back);
    }

    #[test]
    fn single_vertex_polyline_is_degenerate_line() {
        let line = polyline(&[(1.0, 2.0)]);
        assert_eq!(line.0.len(), 2);
    }

    proptest::proptest! {
        #[test]
        fn cell_size_is_min_positive_spacing(
            cols in 1_usize..8,
            rows in 1_usize..8,
            size in 1.0_f64..500.0,
            x0 in -1.0e4_f64..1.0e4,
            y0 in -1.0e4_f64..1.0e4,
        ) {
            let size = size.round();
            let x0 = x0.round();
            let y0 = y0.round();
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for r in 0..rows {
                for c in 0..cols {
                    xs.push(x0 + c as f64 * size);
                    ys.push(y0 + r as f64 * size);
                }
            }
            let got = cell_size_from_centroids(&xs, &ys);
            if cols == 1 && rows == 1 {
                proptest::prop_assert_eq!(got, None);
            } else {
                proptest::prop_assert_eq!(got, Some(size));
            }
        }
    }
}
