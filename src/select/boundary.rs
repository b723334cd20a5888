//! Region boundary extraction from cell edges.
//!
//! Algorithm:
//! 1. For every cell in the region, keep the axis-aligned edges with no
//!    same-region cell on the other side (4-directional adjacency).
//! 2. Build a corner-adjacency graph from the kept edges.
//! 3. Trace closed walks until every edge is used.
//!
//! Adjacency here is 4-directional on purpose, even though region grouping is
//! 8-directional: a diagonally chained region still draws all four edges of
//! each cell, so the rendered outline stays visually contiguous.

use ahash::{AHashMap, AHashSet};
use geo::Coord;
use smallvec::SmallVec;

use crate::types::Cell;

/// A corner of the cell lattice, keyed by integer lattice position so edge
/// endpoints match exactly without floating-point comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CornerKey {
    row: i32,
    col: i32,
}

/// Outer polygon boundaries of one region of cells, as closed polylines.
///
/// An edge is "outer" iff no other cell of the region occupies the adjacent
/// lattice position. Each returned ring lists one point per outer edge; the
/// last point connects back to the first implicitly. A single isolated cell
/// yields one 4-point rectangle. Cells are assumed to share one lattice
/// (consistent row/col and bounds).
pub fn trace_boundary(cells: &[Cell]) -> Vec<Vec<Coord<f64>>> {
    if cells.is_empty() {
        return Vec::new();
    }

    let occupied: AHashSet<(i32, i32)> = cells.iter().map(|c| (c.row, c.col)).collect();

    // Collect outer edges as corner-key pairs, remembering each corner's
    // geographic position. Corner (r, c) is the cell (r, c) min-corner.
    let mut edges: Vec<(CornerKey, CornerKey)> = Vec::new();
    let mut corner_coords: AHashMap<CornerKey, Coord<f64>> = AHashMap::new();
    for cell in cells {
        let (r, c) = (cell.row, cell.col);
        let sw = CornerKey { row: r, col: c };
        let se = CornerKey { row: r, col: c + 1 };
        let nw = CornerKey { row: r + 1, col: c };
        let ne = CornerKey { row: r + 1, col: c + 1 };
        corner_coords.entry(sw).or_insert(Coord { x: cell.min_lng, y: cell.min_lat });
        corner_coords.entry(se).or_insert(Coord { x: cell.max_lng, y: cell.min_lat });
        corner_coords.entry(nw).or_insert(Coord { x: cell.min_lng, y: cell.max_lat });
        corner_coords.entry(ne).or_insert(Coord { x: cell.max_lng, y: cell.max_lat });

        // South, north, west, east: keep the edge when the 4-neighbor is absent.
        if !occupied.contains(&(r - 1, c)) { edges.push((sw, se)); }
        if !occupied.contains(&(r + 1, c)) { edges.push((nw, ne)); }
        if !occupied.contains(&(r, c - 1)) { edges.push((sw, nw)); }
        if !occupied.contains(&(r, c + 1)) { edges.push((se, ne)); }
    }

    // Corner adjacency; every corner on a closed lattice boundary has even
    // degree, almost always 2.
    let mut adj: AHashMap<CornerKey, SmallVec<[CornerKey; 4]>> = AHashMap::new();
    for &(a, b) in &edges {
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }

    let canonical = |a: CornerKey, b: CornerKey| -> (CornerKey, CornerKey) {
        if (a.row, a.col) <= (b.row, b.col) { (a, b) } else { (b, a) }
    };
    let mut used: AHashSet<(CornerKey, CornerKey)> = AHashSet::new();
    let mut rings: Vec<Vec<Coord<f64>>> = Vec::new();

    for &(start_a, start_b) in &edges {
        if used.contains(&canonical(start_a, start_b)) {
            continue;
        }
        used.insert(canonical(start_a, start_b));

        let mut ring = vec![start_a, start_b];
        let mut prev = start_a;
        let mut curr = start_b;

        // Walk forward along unused continuations until the ring closes.
        for _ in 0..edges.len() {
            if curr == start_a {
                break;
            }
            let Some(neighbors) = adj.get(&curr) else { break };
            let next = neighbors.iter()
                .find(|&&n| n != prev && !used.contains(&canonical(curr, n)))
                .copied();
            let Some(next) = next else { break };
            used.insert(canonical(curr, next));
            prev = curr;
            curr = next;
            ring.push(next);
        }

        // The walk returns to its start on a well-formed lattice boundary;
        // drop the duplicated start so the point count equals the edge count.
        if ring.len() >= 4 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() >= 3 {
            rings.push(ring.iter().map(|key| corner_coords[key]).collect());
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::make_cell;

    fn region(positions: &[(i32, i32)]) -> Vec<Cell> {
        positions.iter().map(|&(r, c)| make_cell(r, c, -50.0)).collect()
    }

    fn ring_is_closed_loop(ring: &[Coord<f64>]) {
        // Consecutive points (wrapping) differ in exactly one axis by one step.
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            let dx = (b.x - a.x).abs();
            let dy = (b.y - a.y).abs();
            let step = 0.001;
            let axis_moves = [dx > 1e-12, dy > 1e-12];
            assert_eq!(axis_moves.iter().filter(|&&m| m).count(), 1, "diagonal or null segment");
            assert!(dx < step * 1.5 && dy < step * 1.5, "segment longer than one cell");
        }
    }

    #[test]
    fn empty_region_has_no_boundary() {
        assert!(trace_boundary(&[]).is_empty());
    }

    #[test]
    fn single_cell_yields_a_four_edge_rectangle() {
        let rings = trace_boundary(&region(&[(0, 0)]));
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
        ring_is_closed_loop(&rings[0]);
        let cell = make_cell(0, 0, -50.0);
        for corner in &rings[0] {
            assert!(corner.y == cell.min_lat || corner.y == cell.max_lat);
            assert!(corner.x == cell.min_lng || corner.x == cell.max_lng);
        }
    }

    #[test]
    fn square_block_boundary_point_count_equals_outer_edges() {
        // 3x3 block: 12 outer edges, interior edges suppressed.
        let positions: Vec<(i32, i32)> =
            (0..3).flat_map(|r| (0..3).map(move |c| (r, c))).collect();
        let rings = trace_boundary(&region(&positions));
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 12);
        ring_is_closed_loop(&rings[0]);
    }

    #[test]
    fn l_shaped_region_traces_one_closed_ring() {
        // 2x2 block missing one corner: 8 outer edges.
        let rings = trace_boundary(&region(&[(0, 0), (0, 1), (1, 0)]));
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 8);
        ring_is_closed_loop(&rings[0]);
    }

    #[test]
    fn diagonal_only_neighbors_draw_all_edges_of_both_cells() {
        // 8-connectivity would group these; 4-connectivity boundary tracing
        // still gives each cell its full rectangle.
        let rings = trace_boundary(&region(&[(0, 0), (1, 1)]));
        assert_eq!(rings.len(), 2);
        for ring in &rings {
            assert_eq!(ring.len(), 4);
            ring_is_closed_loop(ring);
        }
    }

    #[test]
    fn disjoint_cells_give_one_ring_each() {
        let rings = trace_boundary(&region(&[(0, 0), (5, 5), (9, 0)]));
        assert_eq!(rings.len(), 3);
        for ring in &rings {
            assert_eq!(ring.len(), 4);
        }
    }

    #[test]
    fn horizontal_strip_boundary() {
        // 1x4 strip: 2·4 horizontal + 2 vertical = 10 outer edges.
        let rings = trace_boundary(&region(&[(0, 0), (0, 1), (0, 2), (0, 3)]));
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 10);
        ring_is_closed_loop(&rings[0]);
    }

    #[test]
    fn region_with_a_hole_produces_two_rings() {
        // 3x3 ring of cells with the center missing: outer rectangle plus the
        // 4-edge hole outline.
        let positions: Vec<(i32, i32)> = (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .filter(|&(r, c)| (r, c) != (1, 1))
            .collect();
        let rings = trace_boundary(&region(&positions));
        assert_eq!(rings.len(), 2);
        let mut lens: Vec<usize> = rings.iter().map(|r| r.len()).collect();
        lens.sort_unstable();
        assert_eq!(lens, vec![4, 12]);
    }
}
