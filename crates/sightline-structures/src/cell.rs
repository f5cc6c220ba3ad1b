//! Mesh cells and on-demand sub-primitive decomposition.
//!
//! Composite cells (strips, polylines, polyvertices, quads, polygons) and
//! volumetric cells (tetrahedra, hexahedra) decompose into simple points,
//! edges, and triangles on the fly. Decomposition never materializes a
//! second mesh; a [`SubPrim`] carries slot indices into the parent cell's
//! point list, so interpolation weights map straight back to cell points.

/// The kind of a mesh cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// A single point.
    Vertex,
    /// A set of independent points.
    PolyVertex,
    /// A line segment between two points.
    Line,
    /// A chain of connected line segments.
    PolyLine,
    /// A triangle.
    Triangle,
    /// A strip of triangles sharing edges.
    TriangleStrip,
    /// A planar quadrilateral.
    Quad,
    /// A planar convex polygon.
    Polygon,
    /// A tetrahedron (4 points).
    Tetra,
    /// A hexahedron (8 points, axis-ordered box connectivity).
    Hexahedron,
}

impl CellKind {
    /// Topological dimension of the cell.
    #[must_use]
    pub fn dimension(self) -> u32 {
        match self {
            CellKind::Vertex | CellKind::PolyVertex => 0,
            CellKind::Line | CellKind::PolyLine => 1,
            CellKind::Triangle | CellKind::TriangleStrip | CellKind::Quad | CellKind::Polygon => 2,
            CellKind::Tetra | CellKind::Hexahedron => 3,
        }
    }

    /// Whether cells of this kind enclose a volume.
    #[must_use]
    pub fn is_volumetric(self) -> bool {
        self.dimension() == 3
    }

    /// Exact point count for fixed-size kinds, `None` for variable ones.
    #[must_use]
    pub fn exact_points(self) -> Option<usize> {
        match self {
            CellKind::Vertex => Some(1),
            CellKind::Line => Some(2),
            CellKind::Triangle => Some(3),
            CellKind::Quad | CellKind::Tetra => Some(4),
            CellKind::Hexahedron => Some(8),
            CellKind::PolyVertex | CellKind::PolyLine | CellKind::TriangleStrip
            | CellKind::Polygon => None,
        }
    }

    /// Minimum point count for a usable cell of this kind.
    #[must_use]
    pub fn min_points(self) -> usize {
        match self {
            CellKind::Vertex | CellKind::PolyVertex => 1,
            CellKind::Line | CellKind::PolyLine => 2,
            CellKind::Triangle | CellKind::TriangleStrip | CellKind::Polygon => 3,
            CellKind::Quad | CellKind::Tetra => 4,
            CellKind::Hexahedron => 8,
        }
    }
}

/// A simple primitive produced by decomposition.
///
/// Values are slot indices into the parent cell's point list, not global
/// point ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPrim {
    /// A single point slot.
    Point(usize),
    /// An edge between two slots.
    Edge(usize, usize),
    /// A triangle over three slots.
    Tri(usize, usize, usize),
}

/// Face stencil for tetrahedra: 4 triangular faces, outward winding.
pub const TET_FACE_STENCIL: [[usize; 3]; 4] =
    [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

/// Face stencil for hexahedra: 6 quad faces, each as 2 triangles sharing a
/// diagonal, outward winding.
pub const HEX_FACE_STENCIL: [[[usize; 3]; 2]; 6] = [
    [[2, 1, 0], [2, 0, 3]], // Bottom
    [[4, 0, 1], [4, 1, 5]], // Front
    [[5, 1, 2], [5, 2, 6]], // Right
    [[7, 3, 0], [7, 0, 4]], // Left
    [[6, 2, 3], [6, 3, 7]], // Back
    [[7, 4, 5], [7, 5, 6]], // Top
];

/// A mesh cell: a kind plus its point connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// The kind of this cell.
    pub kind: CellKind,
    /// Global point ids, in the kind's canonical order.
    pub points: Vec<u32>,
}

impl Cell {
    /// Creates a cell. Connectivity is validated by the owning mesh.
    #[must_use]
    pub fn new(kind: CellKind, points: Vec<u32>) -> Self {
        Self { kind, points }
    }

    /// Number of simple sub-primitives this cell decomposes into.
    #[must_use]
    pub fn num_sub_primitives(&self) -> usize {
        let n = self.points.len();
        match self.kind {
            CellKind::Vertex | CellKind::Line | CellKind::Triangle => 1.min(n),
            CellKind::PolyVertex => n,
            CellKind::PolyLine => n.saturating_sub(1),
            CellKind::TriangleStrip | CellKind::Polygon => n.saturating_sub(2),
            CellKind::Quad => {
                if n >= 4 {
                    2
                } else {
                    0
                }
            }
            CellKind::Tetra => {
                if n >= 4 {
                    TET_FACE_STENCIL.len()
                } else {
                    0
                }
            }
            CellKind::Hexahedron => {
                if n >= 8 {
                    HEX_FACE_STENCIL.len() * 2
                } else {
                    0
                }
            }
        }
    }

    /// Returns sub-primitive `i`, or `None` past the end.
    #[must_use]
    pub fn sub_primitive(&self, i: usize) -> Option<SubPrim> {
        if i >= self.num_sub_primitives() {
            return None;
        }
        let prim = match self.kind {
            CellKind::Vertex => SubPrim::Point(0),
            CellKind::PolyVertex => SubPrim::Point(i),
            CellKind::Line => SubPrim::Edge(0, 1),
            CellKind::PolyLine => SubPrim::Edge(i, i + 1),
            CellKind::Triangle => SubPrim::Tri(0, 1, 2),
            // Strips alternate winding so all triangles face the same way.
            CellKind::TriangleStrip => {
                if i % 2 == 0 {
                    SubPrim::Tri(i, i + 1, i + 2)
                } else {
                    SubPrim::Tri(i + 1, i, i + 2)
                }
            }
            CellKind::Quad | CellKind::Polygon => SubPrim::Tri(0, i + 1, i + 2),
            CellKind::Tetra => {
                let [a, b, c] = TET_FACE_STENCIL[i];
                SubPrim::Tri(a, b, c)
            }
            CellKind::Hexahedron => {
                let [a, b, c] = HEX_FACE_STENCIL[i / 2][i % 2];
                SubPrim::Tri(a, b, c)
            }
        };
        Some(prim)
    }

    /// Iterates all sub-primitives with their indices.
    pub fn sub_primitives(&self) -> impl Iterator<Item = (usize, SubPrim)> + '_ {
        (0..self.num_sub_primitives()).filter_map(|i| Some((i, self.sub_primitive(i)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert_eq!(CellKind::Vertex.dimension(), 0);
        assert_eq!(CellKind::PolyLine.dimension(), 1);
        assert_eq!(CellKind::Polygon.dimension(), 2);
        assert_eq!(CellKind::Hexahedron.dimension(), 3);
        assert!(CellKind::Tetra.is_volumetric());
        assert!(!CellKind::TriangleStrip.is_volumetric());
    }

    #[test]
    fn test_simple_cells_have_one_sub() {
        let tri = Cell::new(CellKind::Triangle, vec![5, 6, 7]);
        assert_eq!(tri.num_sub_primitives(), 1);
        assert_eq!(tri.sub_primitive(0), Some(SubPrim::Tri(0, 1, 2)));
        assert_eq!(tri.sub_primitive(1), None);

        let line = Cell::new(CellKind::Line, vec![2, 9]);
        assert_eq!(line.sub_primitive(0), Some(SubPrim::Edge(0, 1)));
    }

    #[test]
    fn test_strip_decomposition_alternates() {
        let strip = Cell::new(CellKind::TriangleStrip, vec![0, 1, 2, 3, 4]);
        assert_eq!(strip.num_sub_primitives(), 3);
        assert_eq!(strip.sub_primitive(0), Some(SubPrim::Tri(0, 1, 2)));
        assert_eq!(strip.sub_primitive(1), Some(SubPrim::Tri(2, 1, 3)));
        assert_eq!(strip.sub_primitive(2), Some(SubPrim::Tri(2, 3, 4)));
    }

    #[test]
    fn test_polyline_and_polyvertex() {
        let pl = Cell::new(CellKind::PolyLine, vec![3, 1, 4, 1]);
        assert_eq!(pl.num_sub_primitives(), 3);
        assert_eq!(pl.sub_primitive(2), Some(SubPrim::Edge(2, 3)));

        let pv = Cell::new(CellKind::PolyVertex, vec![8, 9]);
        assert_eq!(pv.num_sub_primitives(), 2);
        assert_eq!(pv.sub_primitive(1), Some(SubPrim::Point(1)));
    }

    #[test]
    fn test_polygon_fan() {
        let poly = Cell::new(CellKind::Polygon, vec![0, 1, 2, 3, 4]);
        assert_eq!(poly.num_sub_primitives(), 3);
        assert_eq!(poly.sub_primitive(0), Some(SubPrim::Tri(0, 1, 2)));
        assert_eq!(poly.sub_primitive(1), Some(SubPrim::Tri(0, 2, 3)));
        assert_eq!(poly.sub_primitive(2), Some(SubPrim::Tri(0, 3, 4)));

        let quad = Cell::new(CellKind::Quad, vec![0, 1, 2, 3]);
        assert_eq!(quad.num_sub_primitives(), 2);
        assert_eq!(quad.sub_primitive(1), Some(SubPrim::Tri(0, 2, 3)));
    }

    #[test]
    fn test_volumetric_faces() {
        let tet = Cell::new(CellKind::Tetra, vec![0, 1, 2, 3]);
        assert_eq!(tet.num_sub_primitives(), 4);
        assert_eq!(tet.sub_primitive(0), Some(SubPrim::Tri(0, 2, 1)));

        let hex = Cell::new(CellKind::Hexahedron, (0..8).collect());
        assert_eq!(hex.num_sub_primitives(), 12);
        assert_eq!(hex.sub_primitive(0), Some(SubPrim::Tri(2, 1, 0)));
        assert_eq!(hex.sub_primitive(1), Some(SubPrim::Tri(2, 0, 3)));
        assert_eq!(hex.sub_primitive(11), Some(SubPrim::Tri(7, 5, 6)));
    }

    #[test]
    fn test_short_cells_decompose_to_nothing() {
        let strip = Cell::new(CellKind::TriangleStrip, vec![0, 1]);
        assert_eq!(strip.num_sub_primitives(), 0);
        assert_eq!(strip.sub_primitive(0), None);

        let hex = Cell::new(CellKind::Hexahedron, vec![0, 1, 2]);
        assert_eq!(hex.num_sub_primitives(), 0);
    }

    #[test]
    fn test_sub_primitives_iterator() {
        let poly = Cell::new(CellKind::Polygon, vec![0, 1, 2, 3]);
        let subs: Vec<_> = poly.sub_primitives().collect();
        assert_eq!(
            subs,
            vec![
                (0, SubPrim::Tri(0, 1, 2)),
                (1, SubPrim::Tri(0, 2, 3)),
            ]
        );
    }
}
