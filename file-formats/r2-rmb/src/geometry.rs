//! Mesh records and geometry reconstruction
//!
//! Raw per-mesh streams carry a flat `u16` index list (or, for some
//! asset families, an explicit face list), per-vertex weight/index
//! slots, and a bone map. Reconstruction turns those into triangles
//! tagged with a material id and per-vertex influences on named bone
//! groups, following the exact range-defaulting rules of the format.

use glam::{Vec2, Vec3};
use rand::Rng;
use std::path::PathBuf;

use r2_data::{DecodeError, Result};

use crate::texture::TextureRef;

/// Fixed-size header of one mesh record
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshHeader {
    /// Declared mesh index
    pub index: i32,
    /// Mesh name
    pub name: String,
    /// Name of the bone this mesh is bound to
    pub parent_bone: String,
    /// Whether the mesh carries per-vertex skin weights
    pub has_armature: bool,
    /// Index into the scene texture table
    pub texture_index: i32,
    /// Declared length of the bone map
    pub bone_map_count: i32,
    /// Declared vertex count
    pub vertices_count: i32,
    /// Declared index count
    pub indices_count: i32,
}

/// A skin: a bone map plus an optional vertex sub-range it applies to
///
/// An empty `bone_map` means weight indices refer directly to skeleton
/// indices. Unset range values default to start 0 / count "rest of the
/// list".
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skin {
    /// Ordered bone-table indices the per-vertex indices select into
    pub bone_map: Vec<u8>,
    pub id_start: Option<usize>,
    pub id_count: Option<usize>,
}

/// One material binding of a mesh
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    /// Start of the triangle-source sub-range this material covers
    pub id_start: Option<usize>,
    /// Length of the sub-range; `None` means "to the end"
    pub id_count: Option<usize>,
    /// Randomized fallback RGBA color for sinks without the texture
    pub color: [f32; 4],
}

impl Material {
    /// Material bound to a resolved texture table entry
    pub fn from_texture(texture: &TextureRef) -> Self {
        Self {
            diffuse: Some(texture.diffuse.clone()),
            specular: texture.specular.clone(),
            normal: texture.normal.clone(),
            ..Self::untextured()
        }
    }

    /// Material without any texture binding
    pub fn untextured() -> Self {
        let mut rng = rand::rng();
        let mut channel = || rng.random_range(0..=255u32) as f32 / 255.0;
        Self {
            diffuse: None,
            specular: None,
            normal: None,
            id_start: None,
            id_count: None,
            color: [channel(), channel(), channel(), 1.0],
        }
    }
}

/// Where a mesh's triangles come from
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriangleSource {
    /// Flat index list, grouped into consecutive triples
    Indices(Vec<u16>),
    /// Explicit triangle list
    Faces(Vec<[u16; 3]>),
}

impl Default for TriangleSource {
    fn default() -> Self {
        Self::Indices(Vec::new())
    }
}

/// A reconstructed triangle with its assigned material id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub indices: [u16; 3],
    pub material_id: usize,
}

/// A single bone-group influence on a vertex
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Influence {
    /// Bone group name the weight binds to
    pub group: String,
    pub weight: f32,
}

/// One decoded mesh with its raw streams and bindings
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshRecord {
    pub header: MeshHeader,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub source: TriangleSource,
    /// Per-vertex weight slots; synthesized meshes carry a single slot
    pub skin_weights: Vec<Vec<f32>>,
    /// Per-vertex bone index slots, parallel to `skin_weights`
    pub skin_indices: Vec<Vec<u8>>,
    pub skins: Vec<Skin>,
    pub materials: Vec<Material>,
    /// Bone group names weight indices resolve against: the skeleton's
    /// names for skinned meshes, the parent bone for rigid ones
    pub group_names: Vec<String>,
}

impl MeshRecord {
    /// Empty record for a decoded header
    pub fn from_header(header: MeshHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Reconstruct the triangle list with material-id assignment
    ///
    /// Without materials the whole source becomes material 0. With
    /// materials, each one contributes its `[id_start, id_count)`
    /// sub-range of the source in declaration order; unset bounds
    /// default to 0 and "the rest". Ranges are clamped to the source.
    pub fn triangulate(&self) -> Vec<Triangle> {
        let mut triangles = Vec::new();
        if self.materials.is_empty() {
            append_range(&mut triangles, &self.source, 0, None, 0);
        } else {
            for (material_id, material) in self.materials.iter().enumerate() {
                append_range(
                    &mut triangles,
                    &self.source,
                    material.id_start.unwrap_or(0),
                    material.id_count,
                    material_id,
                );
            }
        }
        triangles
    }

    /// Per-vertex skin ids, synthesized from the skin ranges
    ///
    /// Each skin assigns its own index to every vertex its range
    /// covers, in declaration order; uncovered vertices stay on skin 0.
    pub fn skin_ids(&self) -> Vec<usize> {
        let vertex_count = self.skin_indices.len();
        if self.skins.is_empty() {
            return Vec::new();
        }
        let mut ids = vec![0usize; vertex_count];
        for (skin_id, skin) in self.skins.iter().enumerate() {
            let start = skin.id_start.unwrap_or(0).min(vertex_count);
            let count = skin
                .id_count
                .unwrap_or_else(|| vertex_count.saturating_sub(start));
            let end = start.saturating_add(count).min(vertex_count);
            for id in &mut ids[start..end] {
                *id = skin_id;
            }
        }
        ids
    }

    /// Resolve raw weight/index slots into named bone-group influences
    ///
    /// Zero weights are dropped. Contributions from slots that resolve
    /// to the same group accumulate; they are never overwritten. Weight
    /// indices go through the vertex's skin bone map when it is
    /// non-empty, otherwise they address the group list directly.
    pub fn resolve_influences(&self) -> Result<Vec<Vec<Influence>>> {
        let ids = self.skin_ids();
        let mut resolved = Vec::with_capacity(ids.len());
        for (vertex, &skin_id) in ids.iter().enumerate() {
            let skin = self.skins.get(skin_id).ok_or_else(|| {
                DecodeError::Reference(format!("skin id {skin_id} out of range"))
            })?;
            let (weights, indices) = self
                .skin_weights
                .get(vertex)
                .zip(self.skin_indices.get(vertex))
                .ok_or_else(|| {
                    DecodeError::Reference(format!("vertex {vertex} has no skin slots"))
                })?;

            let mut influences: Vec<Influence> = Vec::new();
            for (slot, &weight) in weights.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                let raw = *indices.get(slot).ok_or_else(|| {
                    DecodeError::Reference(format!(
                        "vertex {vertex} weight slot {slot} has no index"
                    ))
                })? as usize;
                let group_index = if skin.bone_map.is_empty() {
                    raw
                } else {
                    *skin.bone_map.get(raw).ok_or_else(|| {
                        DecodeError::Reference(format!(
                            "vertex {vertex} skin index {raw} outside bone map"
                        ))
                    })? as usize
                };
                let group = self
                    .group_names
                    .get(group_index)
                    .cloned()
                    .unwrap_or_else(|| group_index.to_string());
                match influences.iter_mut().find(|i| i.group == group) {
                    Some(existing) => existing.weight += weight,
                    None => influences.push(Influence { group, weight }),
                }
            }
            resolved.push(influences);
        }
        Ok(resolved)
    }
}

/// Append one material's clamped sub-range of the source as triangles
fn append_range(
    triangles: &mut Vec<Triangle>,
    source: &TriangleSource,
    start: usize,
    count: Option<usize>,
    material_id: usize,
) {
    match source {
        TriangleSource::Faces(faces) => {
            let start = start.min(faces.len());
            let end = match count {
                Some(count) => start.saturating_add(count).min(faces.len()),
                None => faces.len(),
            };
            for face in &faces[start..end] {
                triangles.push(Triangle {
                    indices: *face,
                    material_id,
                });
            }
        }
        TriangleSource::Indices(indices) => {
            let start = start.min(indices.len());
            let end = match count {
                Some(count) => start.saturating_add(count).min(indices.len()),
                None => indices.len(),
            };
            for triple in indices[start..end].chunks_exact(3) {
                triangles.push(Triangle {
                    indices: [triple[0], triple[1], triple[2]],
                    material_id,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_mesh(indices: Vec<u16>) -> MeshRecord {
        MeshRecord {
            source: TriangleSource::Indices(indices),
            ..MeshRecord::default()
        }
    }

    #[test]
    fn test_triangulate_without_materials_groups_triples() {
        let mesh = indexed_mesh(vec![0, 1, 2, 2, 1, 3]);
        let triangles = mesh.triangulate();
        assert_eq!(
            triangles,
            vec![
                Triangle { indices: [0, 1, 2], material_id: 0 },
                Triangle { indices: [2, 1, 3], material_id: 0 },
            ]
        );
    }

    #[test]
    fn test_triangulate_drops_trailing_partial_triple() {
        let mesh = indexed_mesh(vec![0, 1, 2, 3, 4]);
        assert_eq!(mesh.triangulate().len(), 1);
    }

    #[test]
    fn test_triangulate_face_list() {
        let mesh = MeshRecord {
            source: TriangleSource::Faces(vec![[0, 1, 2], [2, 1, 3]]),
            ..MeshRecord::default()
        };
        let triangles = mesh.triangulate();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].indices, [2, 1, 3]);
    }

    #[test]
    fn test_material_ranges_partition_index_list() {
        let mut mesh = indexed_mesh(vec![0, 1, 2, 2, 1, 3, 3, 1, 4]);
        mesh.materials = vec![
            Material {
                id_start: Some(0),
                id_count: Some(6),
                ..Material::untextured()
            },
            Material {
                id_start: Some(6),
                id_count: Some(3),
                ..Material::untextured()
            },
        ];
        let triangles = mesh.triangulate();
        assert_eq!(triangles.len(), 3);
        assert_eq!(triangles[0].material_id, 0);
        assert_eq!(triangles[1].material_id, 0);
        assert_eq!(triangles[2].material_id, 1);
        // Sum of id_count equals three triangles' worth of indices
        assert_eq!(
            mesh.materials
                .iter()
                .filter_map(|m| m.id_count)
                .sum::<usize>(),
            9
        );
    }

    #[test]
    fn test_material_defaults_cover_whole_source() {
        let mut mesh = indexed_mesh(vec![0, 1, 2, 2, 1, 3]);
        mesh.materials = vec![Material::untextured()];
        let triangles = mesh.triangulate();
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|t| t.material_id == 0));
    }

    #[test]
    fn test_material_range_clamped_to_source() {
        let mut mesh = indexed_mesh(vec![0, 1, 2]);
        mesh.materials = vec![Material {
            id_start: Some(0),
            id_count: Some(300),
            ..Material::untextured()
        }];
        assert_eq!(mesh.triangulate().len(), 1);
    }

    #[test]
    fn test_skin_id_synthesis_by_range() {
        let mut mesh = MeshRecord::default();
        mesh.skin_indices = vec![vec![0]; 4];
        mesh.skin_weights = vec![vec![1.0]; 4];
        mesh.skins = vec![
            Skin { id_start: Some(0), id_count: Some(2), ..Skin::default() },
            Skin { id_start: Some(2), id_count: None, ..Skin::default() },
        ];
        assert_eq!(mesh.skin_ids(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_influences_accumulate_per_group() {
        // Two slots resolving through the bone map to the same bone
        let mut mesh = MeshRecord::default();
        mesh.group_names = vec!["root".into(), "arm".into()];
        mesh.skins = vec![Skin {
            bone_map: vec![1, 1],
            ..Skin::default()
        }];
        mesh.skin_weights = vec![vec![0.25, 0.5, 0.0, 0.0]];
        mesh.skin_indices = vec![vec![0, 1, 0, 0]];

        let influences = mesh.resolve_influences().unwrap();
        assert_eq!(influences[0].len(), 1);
        assert_eq!(influences[0][0].group, "arm");
        assert!((influences[0][0].weight - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_influences_skip_zero_weights() {
        let mut mesh = MeshRecord::default();
        mesh.group_names = vec!["root".into()];
        mesh.skins = vec![Skin::default()];
        mesh.skin_weights = vec![vec![0.0, 1.0]];
        mesh.skin_indices = vec![vec![0, 0]];

        let influences = mesh.resolve_influences().unwrap();
        assert_eq!(influences[0].len(), 1);
        assert_eq!(influences[0][0].weight, 1.0);
    }

    #[test]
    fn test_bone_map_index_out_of_range_is_reference_error() {
        let mut mesh = MeshRecord::default();
        mesh.skins = vec![Skin {
            bone_map: vec![0],
            ..Skin::default()
        }];
        mesh.skin_weights = vec![vec![1.0]];
        mesh.skin_indices = vec![vec![3]];

        assert!(matches!(
            mesh.resolve_influences(),
            Err(r2_data::DecodeError::Reference(_))
        ));
    }

    #[test]
    fn test_unnamed_group_falls_back_to_index() {
        let mut mesh = MeshRecord::default();
        mesh.skins = vec![Skin::default()];
        mesh.skin_weights = vec![vec![1.0]];
        mesh.skin_indices = vec![vec![2]];

        let influences = mesh.resolve_influences().unwrap();
        assert_eq!(influences[0][0].group, "2");
    }
}
