//! OBJ file provider for 3D models
//!
//! Reads Wavefront OBJ text into a [`Model`]. Every `usemtl` switch starts a
//! new sub-mesh so that each sub-mesh carries exactly one material. Face
//! corners are not welded; each corner becomes its own vertex, which keeps
//! per-corner normals intact.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::model::{Material, Model, SubMesh};
use super::mtl_parser::MtlParser;
use super::{AssetProvider, ImportError, ImportFlags, ImportOptions};
use crate::foundation::math::{utils, Vec3};

/// Asset provider for Wavefront OBJ files
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjProvider;

impl ObjProvider {
    /// Create a new OBJ provider
    pub fn new() -> Self {
        Self
    }

    /// Parse OBJ text, resolving `usemtl` names against `materials`
    ///
    /// Unknown material names get default Phong parameters.
    pub fn parse(
        content: &str,
        options: &ImportOptions,
        materials: &HashMap<String, Material>,
    ) -> Result<Model, ImportError> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();
        let mut shared_materials: HashMap<String, Arc<Material>> = HashMap::new();
        let mut finished: Vec<SubMesh> = Vec::new();
        let mut current = SubMeshBuilder::new("default", Arc::new(Material::default()));

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };

            match keyword {
                "v" => positions.push(parse_vec3(&mut tokens, line_num, "vertex")?),
                "vn" => normals.push(parse_vec3(&mut tokens, line_num, "normal")?),
                "usemtl" => {
                    let name = tokens.collect::<Vec<_>>().join(" ");
                    let material = shared_materials
                        .entry(name.clone())
                        .or_insert_with(|| {
                            Arc::new(materials.get(&name).cloned().unwrap_or_else(|| Material::new(name.clone())))
                        })
                        .clone();
                    let group_name = current.name.clone();
                    let previous = std::mem::replace(&mut current, SubMeshBuilder::new(group_name, material));
                    previous.finish_into(&mut finished, options);
                }
                "o" | "g" => {
                    let name = tokens.collect::<Vec<_>>().join(" ");
                    if current.is_empty() {
                        current.name = name;
                    } else {
                        let material = current.material.clone();
                        let previous = std::mem::replace(&mut current, SubMeshBuilder::new(name, material));
                        previous.finish_into(&mut finished, options);
                    }
                }
                "f" => {
                    let corners = tokens
                        .map(|corner| parse_corner(corner, line_num, positions.len(), normals.len()))
                        .collect::<Result<Vec<_>, _>>()?;
                    if corners.len() < 3 {
                        return Err(ImportError::Parse {
                            line: line_num + 1,
                            message: format!("face with {} corners", corners.len()),
                        });
                    }
                    if corners.len() > 3 && !options.flags.contains(ImportFlags::TRIANGULATE) {
                        return Err(ImportError::Unsupported(format!(
                            "line {}: {}-sided face without triangulation",
                            line_num + 1,
                            corners.len()
                        )));
                    }
                    current.push_polygon(&corners, &positions, &normals);
                }
                _ => {
                    // mtllib, vt, s and friends carry nothing the core needs
                }
            }
        }
        current.finish_into(&mut finished, options);

        if finished.is_empty() {
            return Err(ImportError::InvalidFormat("No faces found in OBJ data".to_string()));
        }
        Ok(Model::new(finished))
    }

    fn load_materials(obj_path: &Path, content: &str) -> HashMap<String, Material> {
        let base = obj_path.parent().unwrap_or_else(|| Path::new("."));
        let mut materials = HashMap::new();

        for library in content
            .lines()
            .filter_map(|line| line.trim().strip_prefix("mtllib "))
            .map(str::trim)
        {
            let path = base.join(library);
            let parsed = std::fs::read_to_string(&path)
                .map_err(ImportError::from)
                .and_then(|text| MtlParser::parse(&text));
            match parsed {
                Ok(found) => materials.extend(found),
                Err(e) => log::warn!("Skipping material library {}: {}", path.display(), e),
            }
        }
        materials
    }
}

impl AssetProvider for ObjProvider {
    fn load(&self, path: &Path, options: &ImportOptions) -> Result<Model, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let materials = Self::load_materials(path, &content);
        let model = Self::parse(&content, options, &materials)?.with_source(path);
        log::info!(
            "Imported {} ({} sub-meshes, {} triangles)",
            path.display(),
            model.sub_meshes.len(),
            model.triangle_count()
        );
        Ok(model)
    }
}

/// Resolved face corner: position index and optional normal index
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

struct SubMeshBuilder {
    name: String,
    material: Arc<Material>,
    positions: Vec<Vec3>,
    normals: Vec<Option<Vec3>>,
    source_positions: Vec<usize>,
    indices: Vec<u32>,
}

impl SubMeshBuilder {
    fn new(name: impl Into<String>, material: Arc<Material>) -> Self {
        Self {
            name: name.into(),
            material,
            positions: Vec::new(),
            normals: Vec::new(),
            source_positions: Vec::new(),
            indices: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_polygon(&mut self, corners: &[Corner], positions: &[Vec3], normals: &[Vec3]) {
        let base = self.positions.len() as u32;
        for corner in corners {
            self.positions.push(positions[corner.position]);
            self.normals.push(corner.normal.map(|index| normals[index]));
            self.source_positions.push(corner.position);
        }
        // Fan triangulation
        for i in 1..(corners.len() as u32 - 1) {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    fn finish_into(self, finished: &mut Vec<SubMesh>, options: &ImportOptions) {
        if self.is_empty() {
            return;
        }

        let normals = if self.normals.iter().all(Option::is_some) {
            self.normals.iter().flatten().copied().collect()
        } else if options.flags.contains(ImportFlags::GENERATE_NORMALS) {
            smooth_normals(&self.positions, &self.indices, &self.source_positions, options.smoothing_angle)
        } else {
            Vec::new()
        };

        finished.push(SubMesh::new(self.name, self.positions, normals, self.indices, self.material));
    }
}

/// Per-corner normals averaged across faces that share a source position
/// and lie within `smoothing_angle` degrees of the corner's own face
fn smooth_normals(positions: &[Vec3], indices: &[u32], source_positions: &[usize], smoothing_angle: f32) -> Vec<Vec3> {
    let threshold = utils::deg_to_rad(smoothing_angle.clamp(0.0, 180.0)).cos();

    let face_normals: Vec<Vec3> = indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            (positions[b] - positions[a])
                .cross(&(positions[c] - positions[a]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros)
        })
        .collect();

    let mut own_faces: Vec<Vec<usize>> = vec![Vec::new(); positions.len()];
    let mut faces_at_position: HashMap<usize, Vec<usize>> = HashMap::new();
    for (face, tri) in indices.chunks_exact(3).enumerate() {
        for &vertex in tri {
            own_faces[vertex as usize].push(face);
            faces_at_position.entry(source_positions[vertex as usize]).or_default().push(face);
        }
    }

    (0..positions.len())
        .map(|vertex| {
            let own: Vec3 = own_faces[vertex].iter().map(|&face| face_normals[face]).sum();
            let Some(reference) = own.try_normalize(f32::EPSILON) else {
                return Vec3::y();
            };
            let mut faces = faces_at_position
                .get(&source_positions[vertex])
                .cloned()
                .unwrap_or_default();
            faces.sort_unstable();
            faces.dedup();
            faces
                .into_iter()
                .map(|face| face_normals[face])
                .filter(|normal| normal.dot(&reference) >= threshold)
                .sum::<Vec3>()
                .try_normalize(f32::EPSILON)
                .unwrap_or(reference)
        })
        .collect()
}

fn parse_vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_num: usize, what: &str) -> Result<Vec3, ImportError> {
    let mut next = || {
        tokens
            .next()
            .and_then(|token| token.parse::<f32>().ok())
            .ok_or_else(|| ImportError::Parse {
                line: line_num + 1,
                message: format!("invalid {} component", what),
            })
    };
    Ok(Vec3::new(next()?, next()?, next()?))
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn resolve_index(raw: &str, count: usize, line_num: usize) -> Result<usize, ImportError> {
    let value: i64 = raw.parse().map_err(|_| ImportError::Parse {
        line: line_num + 1,
        message: format!("invalid index '{}'", raw),
    })?;
    let resolved = match value {
        v if v > 0 => v - 1,
        v if v < 0 => count as i64 + v,
        _ => -1,
    };
    usize::try_from(resolved)
        .ok()
        .filter(|&index| index < count)
        .ok_or_else(|| ImportError::InvalidFormat(format!("line {}: index {} out of bounds", line_num + 1, value)))
}

fn parse_corner(corner: &str, line_num: usize, position_count: usize, normal_count: usize) -> Result<Corner, ImportError> {
    let mut parts = corner.split('/');
    let position = resolve_index(parts.next().unwrap_or_default(), position_count, line_num)?;
    let _tex_coord = parts.next();
    let normal = match parts.next() {
        Some(raw) if !raw.is_empty() => Some(resolve_index(raw, normal_count, line_num)?),
        _ => None,
    };
    Ok(Corner { position, normal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn options() -> ImportOptions {
        ImportOptions::default()
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let model = ObjProvider::parse(obj, &options(), &HashMap::new()).unwrap();

        let sub = &model.sub_meshes[0];
        assert_eq!(sub.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(sub.normals.len(), 4);
        for normal in &sub.normals {
            assert_relative_eq!(*normal, Vec3::z(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_quad_without_triangulation_is_rejected() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let options = ImportOptions { flags: ImportFlags::GENERATE_NORMALS, ..ImportOptions::default() };
        let err = ObjProvider::parse(obj, &options, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ImportError::Unsupported(_)));
    }

    #[test]
    fn test_usemtl_splits_sub_meshes_and_shares_materials() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Red
f 1 2 3
usemtl Blue
f 1 3 2
usemtl Red
f 1 2 3
";
        let mut library = HashMap::new();
        library.insert("Red".to_string(), Material::new("Red").with_diffuse(1.0, 0.0, 0.0));
        let model = ObjProvider::parse(obj, &options(), &library).unwrap();

        assert_eq!(model.sub_meshes.len(), 3);
        assert_eq!(model.sub_meshes[0].material.diffuse.x, 1.0);
        assert_eq!(model.sub_meshes[1].material.name, "Blue");
        assert!(Arc::ptr_eq(&model.sub_meshes[0].material, &model.sub_meshes[2].material));
    }

    #[test]
    fn test_explicit_and_negative_normal_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//-1 2//1 3//1\n";
        let model = ObjProvider::parse(obj, &options(), &HashMap::new()).unwrap();
        assert_eq!(model.sub_meshes[0].normals, vec![-Vec3::z(); 3]);
    }

    #[test]
    fn test_out_of_bounds_index() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = ObjProvider::parse(obj, &options(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidFormat(_)));
    }

    #[test]
    fn test_no_faces_is_invalid() {
        let err = ObjProvider::parse("v 0 0 0\n", &options(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidFormat(_)));
    }

    #[test]
    fn test_sharp_edge_is_not_smoothed() {
        // Two faces meeting at a right angle along the edge (1, 2)
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 2 3\nf 2 1 4\n";
        let model = ObjProvider::parse(obj, &options(), &HashMap::new()).unwrap();
        let sub = &model.sub_meshes[0];

        assert_relative_eq!(sub.normals[0], Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(sub.normals[3], Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_shallow_edge_is_smoothed_within_angle() {
        // Second face tilts about 27 degrees away from the first along edge (1, 2)
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0.5 -1 0.5\nf 1 2 3\nf 2 1 4\n";
        let tilted = Vec3::new(0.0, 0.5, 1.0).normalize();
        let blended = (Vec3::z() + tilted).normalize();

        let model = ObjProvider::parse(obj, &options(), &HashMap::new()).unwrap();
        let normals = &model.sub_meshes[0].normals;
        assert_relative_eq!(normals[0], blended, epsilon = 1e-5);
        assert_relative_eq!(normals[3], blended, epsilon = 1e-5);
        assert_relative_eq!(normals[2], Vec3::z(), epsilon = 1e-5);

        let tight = ImportOptions { smoothing_angle: 20.0, ..ImportOptions::default() };
        let model = ObjProvider::parse(obj, &tight, &HashMap::new()).unwrap();
        let normals = &model.sub_meshes[0].normals;
        assert_relative_eq!(normals[0], Vec3::z(), epsilon = 1e-5);
        assert_relative_eq!(normals[3], tilted, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ObjProvider::new()
            .load(Path::new("no/such/teapot.obj"), &options())
            .unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }
}
