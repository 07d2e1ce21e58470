//! Static meshes and the procedural Bezier patch sheet.

use std::f32::consts::PI;

use super::shaders::{Position, VertexPositionColor};

/// Control points per bicubic patch.
pub const PATCH_CONTROL_POINTS: u32 = 16;

/// Cubic Bezier basis, shared by both parametric directions.
pub const BEZIER_BASIS: [[f32; 4]; 4] = [
    [-1.0, 3.0, -3.0, 1.0],
    [3.0, -6.0, 3.0, 0.0],
    [-3.0, 3.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 0.0],
];

pub const CUBE_VERTICES: [VertexPositionColor; 8] = [
    VertexPositionColor {
        position: [-0.5, -0.5, 0.5, 1.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
    VertexPositionColor {
        position: [-0.5, 0.5, 0.5, 1.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    VertexPositionColor {
        position: [0.5, 0.5, 0.5, 1.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    VertexPositionColor {
        position: [0.5, -0.5, 0.5, 1.0],
        color: [1.0, 1.0, 0.0, 1.0],
    },
    VertexPositionColor {
        position: [-0.5, -0.5, -0.5, 1.0],
        color: [1.0, 1.0, 1.0, 1.0],
    },
    VertexPositionColor {
        position: [-0.5, 0.5, -0.5, 1.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    VertexPositionColor {
        position: [0.5, 0.5, -0.5, 1.0],
        color: [1.0, 0.0, 1.0, 1.0],
    },
    VertexPositionColor {
        position: [0.5, -0.5, -0.5, 1.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

/// Counter-clockwise when seen from outside.
pub const CUBE_INDICES: [u16; 36] = [
    0, 2, 1, 0, 3, 2, //
    4, 3, 0, 4, 7, 3, //
    4, 1, 5, 4, 0, 1, //
    3, 6, 2, 3, 7, 6, //
    1, 6, 5, 1, 2, 6, //
    7, 5, 6, 7, 4, 5,
];

const ICOSAHEDRON_POSITIONS: [[f32; 3]; 12] = [
    [0.000, 0.000, 1.000],
    [0.894, 0.000, 0.447],
    [0.276, 0.851, 0.447],
    [-0.724, 0.526, 0.447],
    [-0.724, -0.526, 0.447],
    [0.276, -0.851, 0.447],
    [0.724, 0.526, -0.447],
    [-0.276, 0.851, -0.447],
    [-0.894, 0.000, -0.447],
    [-0.276, -0.851, -0.447],
    [0.724, -0.526, -0.447],
    [0.000, 0.000, -1.000],
];

// Clockwise from outside; flipped in `icosahedron_indices`.
const ICOSAHEDRON_FACES: [[u16; 3]; 20] = [
    [2, 1, 0],
    [3, 2, 0],
    [4, 3, 0],
    [5, 4, 0],
    [1, 5, 0],
    [11, 6, 7],
    [11, 7, 8],
    [11, 8, 9],
    [11, 9, 10],
    [11, 10, 6],
    [1, 2, 6],
    [2, 3, 7],
    [3, 4, 8],
    [4, 5, 9],
    [5, 1, 10],
    [2, 7, 6],
    [3, 8, 7],
    [4, 9, 8],
    [5, 10, 9],
    [1, 6, 10],
];

/// Colored by position so adjacent faces are told apart.
pub fn icosahedron_vertices() -> Vec<VertexPositionColor> {
    ICOSAHEDRON_POSITIONS
        .iter()
        .map(|&[x, y, z]| VertexPositionColor {
            position: [x, y, z, 1.0],
            color: [x * 0.5 + 0.5, y * 0.5 + 0.5, z * 0.5 + 0.5, 1.0],
        })
        .collect()
}

pub fn icosahedron_indices() -> Vec<u16> {
    ICOSAHEDRON_FACES
        .iter()
        .flat_map(|&[a, b, c]| [a, c, b])
        .collect()
}

/// A 2 x 2 grid of bicubic patches forming a rippled sheet over [-1, 1] in X and Z.
///
/// Neighbouring patches share their boundary row of control points, so the
/// sheet is continuous. Points are laid out 16 per patch, row by row.
pub fn patch_sheet() -> Vec<Position> {
    const PATCHES_PER_SIDE: usize = 2;
    const GRID: usize = PATCHES_PER_SIDE * 3 + 1;

    let control_point = |gx: usize, gz: usize| {
        let x = -1.0 + 2.0 * gx as f32 / (GRID - 1) as f32;
        let z = -1.0 + 2.0 * gz as f32 / (GRID - 1) as f32;
        let y = 0.4 * (PI * x).sin() * (0.5 * PI * z).cos();
        Position {
            position: [x, y, z],
        }
    };

    let mut points = Vec::with_capacity(PATCHES_PER_SIDE * PATCHES_PER_SIDE * 16);
    for pu in 0..PATCHES_PER_SIDE {
        for pv in 0..PATCHES_PER_SIDE {
            for i in 0..4 {
                for j in 0..4 {
                    points.push(control_point(pu * 3 + i, pv * 3 + j));
                }
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn outward(positions: &[[f32; 3]], indices: &[u16]) {
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vector3::from(positions[i as usize]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "face {tri:?} points inward");
        }
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_from_outside() {
        let positions: Vec<[f32; 3]> = CUBE_VERTICES
            .iter()
            .map(|v| [v.position[0], v.position[1], v.position[2]])
            .collect();
        outward(&positions, &CUBE_INDICES);
    }

    #[test]
    fn icosahedron_faces_wind_counter_clockwise_from_outside() {
        let indices = icosahedron_indices();
        assert_eq!(indices.len(), 60);
        outward(&ICOSAHEDRON_POSITIONS, &indices);
    }

    #[test]
    fn indices_stay_in_range() {
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_VERTICES.len()));
        let vertices = icosahedron_vertices();
        assert!(icosahedron_indices()
            .iter()
            .all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn patch_sheet_is_whole_patches() {
        let points = patch_sheet();
        assert_eq!(points.len(), 4 * PATCH_CONTROL_POINTS as usize);
    }

    #[test]
    fn neighbouring_patches_share_boundaries() {
        let points = patch_sheet();
        let patch = |n: usize| &points[n * 16..(n + 1) * 16];

        // patch 0 is (0, 0), patch 2 is (1, 0): last row of one is the first row of the other
        for j in 0..4 {
            assert_eq!(patch(0)[12 + j], patch(2)[j]);
        }
        // patch 1 is (0, 1): last column of patch 0 is its first column
        for i in 0..4 {
            assert_eq!(patch(0)[i * 4 + 3], patch(1)[i * 4]);
        }
    }

    #[test]
    fn bezier_basis_reproduces_endpoints() {
        // u = 0 selects the first control point, u = 1 the last
        let at = |u: f32| {
            let powers = [u * u * u, u * u, u, 1.0];
            (0..4)
                .map(|col| (0..4).map(|row| powers[row] * BEZIER_BASIS[row][col]).sum::<f32>())
                .collect::<Vec<_>>()
        };
        assert_eq!(at(0.0), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(at(1.0), vec![0.0, 0.0, 0.0, 1.0]);
    }
}
