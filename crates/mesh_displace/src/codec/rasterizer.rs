//! The rasterizer seam of the GPU bake path.
//!
//! The compiler never renders anything itself. A [`UvRasterizer`] receives the mesh and a
//! `width x height` viewport and must return `width * height * 4` bytes with the UVs packed
//! as in [`crate::codec::pack_uv`] at covered pixels and zero alpha elsewhere. A GPU backend
//! implements the trait outside this crate; [`SoftwareUvRasterizer`] is a CPU stand-in.
use glam::Vec2;

use crate::codec::{pack_uv, UNCOVERED};
use crate::error::Result;
use crate::mesh::GridMesh;
use crate::raster::RasterBuffer;

/// Barycentric slack so pixel centres on a shared edge are never dropped by both triangles.
const EDGE_TOLERANCE: f32 = 1e-5;

/// Rasterizes a mesh's UVs into a packed RGBA8 buffer.
pub trait UvRasterizer {
    fn rasterize(&self, mesh: &GridMesh, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Adapter that turns a closure into a [`UvRasterizer`].
pub struct FnRasterizer<F>
where
    F: Fn(&GridMesh, u32, u32) -> Result<Vec<u8>>,
{
    f: F,
}

impl<F> FnRasterizer<F>
where
    F: Fn(&GridMesh, u32, u32) -> Result<Vec<u8>>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> UvRasterizer for FnRasterizer<F>
where
    F: Fn(&GridMesh, u32, u32) -> Result<Vec<u8>>,
{
    #[inline]
    fn rasterize(&self, mesh: &GridMesh, width: u32, height: u32) -> Result<Vec<u8>> {
        (self.f)(mesh, width, height)
    }
}

/// CPU rasterizer that samples each triangle at pixel centres.
///
/// Mesh space is centred on the viewport with both axes running opposite to pixel space:
/// `px = width / 2 - x`, `py = height / 2 - y`. UVs are interpolated barycentrically.
/// Triangles are drawn in index order without depth testing; where folded triangles
/// overlap, the later one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareUvRasterizer;

impl SoftwareUvRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Pixel-space position of a mesh vertex.
    #[inline]
    pub fn to_viewport(p: Vec2, width: u32, height: u32) -> Vec2 {
        Vec2::new(width as f32 / 2.0 - p.x, height as f32 / 2.0 - p.y)
    }

    fn draw_triangle(target: &mut RasterBuffer, screen: [Vec2; 3], uvs: [Vec2; 3]) {
        let [a, b, c] = screen;
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }

        let (w, h) = target.size();
        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        let x0 = (min.x - 0.5).ceil().max(0.0) as u32;
        let y0 = (min.y - 0.5).ceil().max(0.0) as u32;
        let x1 = ((max.x - 0.5).floor().min(w as f32 - 1.0)).max(-1.0);
        let y1 = ((max.y - 0.5).floor().min(h as f32 - 1.0)).max(-1.0);
        if x1 < 0.0 || y1 < 0.0 {
            return;
        }
        let (x1, y1) = (x1 as u32, y1 as u32);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < -EDGE_TOLERANCE || w1 < -EDGE_TOLERANCE || w2 < -EDGE_TOLERANCE {
                    continue;
                }
                let uv = uvs[0] * w0 + uvs[1] * w1 + uvs[2] * w2;
                target.set_pixel(px, py, pack_uv(uv));
            }
        }
    }
}

impl UvRasterizer for SoftwareUvRasterizer {
    fn rasterize(&self, mesh: &GridMesh, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut target = RasterBuffer::filled(width, height, UNCOVERED);
        let screen: Vec<Vec2> = mesh
            .vertices
            .iter()
            .map(|v| Self::to_viewport(v.truncate(), width, height))
            .collect();

        for [i0, i1, i2] in mesh.triangles() {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
            let (Some(&a), Some(&b), Some(&c)) = (screen.get(i0), screen.get(i1), screen.get(i2))
            else {
                continue;
            };
            let uvs = [
                mesh.uvs.get(i0).copied().unwrap_or_default(),
                mesh.uvs.get(i1).copied().unwrap_or_default(),
                mesh.uvs.get(i2).copied().unwrap_or_default(),
            ];
            Self::draw_triangle(&mut target, [a, b, c], uvs);
        }

        Ok(target.into_raw())
    }
}

/// Twice the signed area of `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
