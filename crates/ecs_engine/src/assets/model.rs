//! In-memory mesh/material graph
//!
//! A [`Model`] is what asset providers hand to the core: a list of sub-meshes,
//! each with positions, normals, triangle indices and a shared material.
//!
//! Sub-meshes and materials are held behind `Arc`. Their *identity* (the
//! allocation, not the contents) is what renderer caches key on, so two
//! byte-identical meshes loaded from different files stay distinct.

use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::math::{Vec3, Vec4};

/// Surface material (Wavefront Phong parameters)
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Ambient color (Ka)
    pub ambient: Vec4,
    /// Diffuse color (Kd), alpha from dissolve
    pub diffuse: Vec4,
    /// Specular color (Ks)
    pub specular: Vec4,
    /// Emissive color (Ke)
    pub emissive: Vec4,
    /// Specular exponent (Ns)
    pub shininess: f32,
}

impl Material {
    /// Create a material with default properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Vec4::new(1.0, 1.0, 1.0, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(0.5, 0.5, 0.5, 1.0),
            emissive: Vec4::new(0.0, 0.0, 0.0, 1.0),
            shininess: 250.0,
        }
    }

    /// Set the diffuse color
    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = Vec4::new(r, g, b, self.diffuse.w);
        self
    }

    /// Set opacity (0.0 = transparent, 1.0 = opaque)
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.diffuse.w = alpha.clamp(0.0, 1.0);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

/// One drawable piece of a model with a single material
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    /// Name from the source file, or a generated one
    pub name: String,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Per-vertex normals; empty when the source had none
    pub normals: Vec<Vec3>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
    /// Material shared with other sub-meshes of the same model
    pub material: Arc<Material>,
}

impl SubMesh {
    /// Create a sub-mesh
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
        material: Arc<Material>,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            normals,
            indices,
            material,
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fill `normals` by averaging adjacent face normals, if missing
    pub fn ensure_normals(&mut self) {
        if self.normals.len() == self.positions.len() {
            return;
        }
        let mut normals = vec![Vec3::zeros(); self.positions.len()];
        for triangle in self.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (self.positions.get(a), self.positions.get(b), self.positions.get(c)) else {
                continue;
            };
            // Unnormalized cross product weights by triangle area
            let face = (pb - pa).cross(&(pc - pa));
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y))
            .collect();
    }
}

/// An imported mesh/material graph
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// File the model came from, if any
    pub source: Option<PathBuf>,
    /// Drawable pieces
    pub sub_meshes: Vec<Arc<SubMesh>>,
}

impl Model {
    /// Create a model from sub-meshes
    pub fn new(sub_meshes: Vec<SubMesh>) -> Self {
        Self {
            source: None,
            sub_meshes: sub_meshes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Record the file this model came from
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Total triangle count across sub-meshes
    pub fn triangle_count(&self) -> usize {
        self.sub_meshes.iter().map(|sub| sub.triangle_count()).sum()
    }

    /// Single triangle in the XY plane facing +Z
    pub fn triangle() -> Self {
        let positions = vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        ];
        let normals = vec![Vec3::z(); 3];
        let material = Arc::new(Material::new("triangle"));
        Self::new(vec![SubMesh::new("triangle", positions, normals, vec![0, 1, 2], material)])
    }

    /// Unit cube centered on the origin with per-face normals
    pub fn cube() -> Self {
        let faces = [
            (Vec3::z(), Vec3::x(), Vec3::y()),
            (-Vec3::z(), -Vec3::x(), Vec3::y()),
            (Vec3::x(), -Vec3::z(), Vec3::y()),
            (-Vec3::x(), Vec3::z(), Vec3::y()),
            (Vec3::y(), Vec3::x(), -Vec3::z()),
            (-Vec3::y(), Vec3::x(), Vec3::z()),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, right, up) in faces {
            let base = positions.len() as u32;
            let center = normal * 0.5;
            for (u, v) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                positions.push(center + right * u + up * v);
                normals.push(normal);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        let material = Arc::new(Material::new("cube"));
        Self::new(vec![SubMesh::new("cube", positions, normals, indices, material)])
    }
}
