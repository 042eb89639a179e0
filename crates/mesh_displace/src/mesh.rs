//! Grid mesh builder.
//!
//! Turns a [`GridSpec`] and an [`OffsetMap`] into the buffers a renderer needs to draw the
//! warped image: centred vertex positions, inverted UVs, a triangle list and a wireframe
//! copy of the positions pulled in from the right and top borders.
//!
//! Offsets are looked up by [`GridSpec::mirrored_index`] and subtracted from the rest
//! position. Both conventions are relied on by consumers of the mesh.
use glam::{Vec2, Vec3};
use tracing::debug;

use crate::error::Result;
use crate::grid::{GridSpec, OffsetMap};

/// Vertex, UV and index buffers for a displaced grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridMesh {
    /// Vertex positions in emission order (row-major from row 0), z always 0.
    pub vertices: Vec<Vec3>,
    /// Same as `vertices` with the last column shifted left and row 0 shifted up by one unit.
    pub wireframe_vertices: Vec<Vec3>,
    /// Per-vertex texture coordinates, both axes inverted.
    pub uvs: Vec<Vec2>,
    /// Triangle list, six indices per quad.
    pub indices: Vec<u32>,
}

impl GridMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions flattened to `x, y, z` triples.
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Wireframe positions flattened to `x, y, z` triples.
    pub fn wireframe_buffer(&self) -> Vec<f32> {
        self.wireframe_vertices
            .iter()
            .flat_map(|v| v.to_array())
            .collect()
    }

    /// UVs flattened to `u, v` pairs.
    pub fn uv_buffer(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Iterates triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Builds the mesh for a grid, failing with [`crate::error::Error::InvalidDimension`] if the
/// grid is degenerate.
pub fn build_mesh(grid: &GridSpec, offsets: &OffsetMap) -> Result<GridMesh> {
    grid.validate()?;
    let nx = grid.node_count_x;
    let ny = grid.node_count_y;
    let half = Vec2::new(grid.width as f32, grid.height as f32) / 2.0;
    let node_count = grid.node_count();

    let mut vertices = Vec::with_capacity(node_count);
    let mut wireframe_vertices = Vec::with_capacity(node_count);
    let mut uvs = Vec::with_capacity(node_count);

    for row in 0..ny {
        for col in 0..nx {
            let rest = grid.rest_position(col, row) - half;
            let offset = offsets.get(grid.mirrored_index(col, row));

            let mut position = rest;
            let mut wire = rest;
            if col == nx - 1 {
                wire.x -= 1.0;
            }
            if row == 0 {
                wire.y += 1.0;
            }
            if let Some(offset) = offset {
                position -= offset.as_vec2();
                wire -= offset.as_vec2();
            }

            vertices.push(position.extend(0.0));
            wireframe_vertices.push(wire.extend(0.0));
            uvs.push(Vec2::new(
                1.0 - col as f32 / (nx - 1) as f32,
                1.0 - row as f32 / (ny - 1) as f32,
            ));
        }
    }

    let mut indices = Vec::with_capacity(grid.quad_count() * 6);
    for row in 0..ny - 1 {
        for col in 0..nx - 1 {
            let top_left = grid.raster_index(col, row) as u32;
            let top_right = top_left + 1;
            let bottom_left = top_left + nx;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    debug!(
        "Built {}x{} node mesh: {} vertices, {} triangles.",
        nx,
        ny,
        vertices.len(),
        indices.len() / 3
    );

    Ok(GridMesh {
        vertices,
        wireframe_vertices,
        uvs,
        indices,
    })
}

/// Builds the mesh from loose grid parameters.
pub fn build_mesh_from_parts(
    node_count_x: u32,
    node_count_y: u32,
    width: u32,
    height: u32,
    offsets: &OffsetMap,
) -> Result<GridMesh> {
    let grid = GridSpec::try_new(node_count_x, node_count_y, width, height)?;
    build_mesh(&grid, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::grid::NodeOffset;

    fn grid(nx: u32, ny: u32, w: u32, h: u32) -> GridSpec {
        GridSpec::try_new(nx, ny, w, h).expect("valid grid")
    }

    fn mesh_for(grid: &GridSpec, offsets: &OffsetMap) -> GridMesh {
        build_mesh(grid, offsets).expect("mesh")
    }

    #[test]
    fn single_quad_has_two_triangles_in_fixed_winding() {
        let mesh = mesh_for(&grid(2, 2, 100, 100), &OffsetMap::new());
        assert_eq!(mesh.indices, vec![0, 2, 1, 1, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn vertices_are_centred_on_origin() {
        let mesh = mesh_for(&grid(2, 2, 100, 60), &OffsetMap::new());
        assert_eq!(mesh.vertices[0], Vec3::new(-50.0, -30.0, 0.0));
        assert_eq!(mesh.vertices[1], Vec3::new(50.0, -30.0, 0.0));
        assert_eq!(mesh.vertices[2], Vec3::new(-50.0, 30.0, 0.0));
        assert_eq!(mesh.vertices[3], Vec3::new(50.0, 30.0, 0.0));
    }

    #[test]
    fn uvs_are_inverted_on_both_axes() {
        let mesh = mesh_for(&grid(3, 2, 30, 10), &OffsetMap::new());
        assert_eq!(mesh.uvs[0], Vec2::new(1.0, 1.0));
        assert_eq!(mesh.uvs[1], Vec2::new(0.5, 1.0));
        assert_eq!(mesh.uvs[5], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn single_offset_moves_only_the_mirrored_vertex() {
        let g = grid(4, 3, 120, 60);
        let key = 1;
        let offsets = OffsetMap::new().with(key, NodeOffset::new(5.0, -2.0));
        let rest = mesh_for(&g, &OffsetMap::new());
        let moved = mesh_for(&g, &offsets);

        let changed: Vec<usize> = (0..rest.vertices.len())
            .filter(|&i| rest.vertices[i] != moved.vertices[i])
            .collect();

        // Key 1 mirrors to column 2 on the last row.
        let expected = g.raster_index(2, 2);
        assert_eq!(g.mirrored_index(2, 2), key);
        assert_eq!(changed, vec![expected]);
        assert_eq!(
            moved.vertices[expected],
            rest.vertices[expected] - Vec3::new(5.0, -2.0, 0.0)
        );
        assert_eq!(
            moved.wireframe_vertices[expected],
            rest.wireframe_vertices[expected] - Vec3::new(5.0, -2.0, 0.0)
        );
    }

    #[test]
    fn wireframe_pulls_in_right_column_and_first_row() {
        let g = grid(3, 3, 90, 60);
        let mesh = mesh_for(&g, &OffsetMap::new());
        for row in 0..3 {
            for col in 0..3 {
                let i = g.raster_index(col, row);
                let main = mesh.vertices[i];
                let wire = mesh.wireframe_vertices[i];
                let dx = if col == 2 { -1.0 } else { 0.0 };
                let dy = if row == 0 { 1.0 } else { 0.0 };
                assert_eq!(wire.x - main.x, dx, "col {col} row {row}");
                assert_eq!(wire.y - main.y, dy, "col {col} row {row}");
                assert_eq!(wire.z, 0.0);
            }
        }
    }

    #[test]
    fn index_buffer_covers_every_quad() {
        let g = grid(4, 3, 40, 20);
        let mesh = mesh_for(&g, &OffsetMap::new());
        assert_eq!(mesh.indices.len(), g.quad_count() * 6);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertex_count()));
        // Second quad of the second row.
        let quad = &mesh.indices[(4 * 6)..(5 * 6)];
        assert_eq!(quad, &[5, 9, 6, 6, 9, 10]);
    }

    #[test]
    fn flat_buffers_match_component_counts() {
        let mesh = mesh_for(&grid(3, 2, 10, 10), &OffsetMap::new());
        assert_eq!(mesh.vertex_buffer().len(), 18);
        assert_eq!(mesh.wireframe_buffer().len(), 18);
        assert_eq!(mesh.uv_buffer().len(), 12);
    }

    #[test]
    fn build_is_deterministic() {
        let g = grid(5, 4, 64, 48);
        let offsets = OffsetMap::new()
            .with(3, NodeOffset::new(1.25, 2.5))
            .with(11, NodeOffset::new(-4.0, 0.75));
        assert_eq!(mesh_for(&g, &offsets), mesh_for(&g, &offsets));
    }

    #[test]
    fn degenerate_grid_is_rejected_before_building() {
        let bad = GridSpec {
            node_count_x: 0,
            node_count_y: 2,
            width: 10,
            height: 10,
        };
        assert!(matches!(
            build_mesh(&bad, &OffsetMap::new()),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn from_parts_rejects_invalid_dimensions() {
        let err = build_mesh_from_parts(2, 1, 10, 10, &OffsetMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension(_)));
    }
}
