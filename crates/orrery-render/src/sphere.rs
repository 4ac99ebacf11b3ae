//! Procedural UV sphere shared by every body and the sky.

use std::f32::consts::{PI, TAU};

use crate::buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};

pub const MIN_STACKS: u32 = 2;
pub const MIN_SECTORS: u32 = 3;

/// Unit-radius sphere geometry on the CPU.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

/// Unit sphere with `stacks` latitude bands and `sectors` longitude slices.
///
/// Rows run from the north pole (v = 0) to the south pole (v = 1); the seam
/// column is duplicated so u spans 0..=1. Triangles wind counter-clockwise
/// seen from outside.
pub fn uv_sphere(stacks: u32, sectors: u32) -> SphereMesh {
    let stacks = stacks.max(MIN_STACKS);
    let sectors = sectors.max(MIN_SECTORS);

    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let latitude = PI / 2.0 - v * PI;
        let (sin_lat, cos_lat) = latitude.sin_cos();
        for j in 0..=sectors {
            let u = j as f32 / sectors as f32;
            let (sin_lon, cos_lon) = (u * TAU).sin_cos();
            let position = [cos_lat * sin_lon, sin_lat, cos_lat * cos_lon];
            vertices.push(VertexPositionNormalUv {
                position,
                normal: position,
                uv: [u, v],
            });
        }
    }

    let row = sectors + 1;
    let mut indices = Vec::with_capacity((6 * sectors * (stacks - 1)) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let k1 = i * row + j;
            let k2 = k1 + row;
            // pole rows collapse to a single triangle per sector
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
        }
    }

    SphereMesh { vertices, indices }
}

impl SphereMesh {
    /// Upload, using 16-bit indices when they fit.
    pub fn upload(&self, allocator: &BufferAllocator<'_>, label: &str) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        match IndexData::compact(&self.indices) {
            Some(short) => allocator.create_mesh(label, vertices, IndexData::U16(&short)),
            None => allocator.create_mesh(label, vertices, IndexData::U32(&self.indices)),
        }
    }
}
