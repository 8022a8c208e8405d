//! Sequential decoder for the `.rmb` container
//!
//! The layout is strictly ordered with no backtracking: header, texture
//! table, mesh headers, bone table, then per-mesh geometry blocks. The
//! skeleton is assembled immediately after the bone table because the
//! geometry blocks resolve bone identities against it.
//!
//! Two read depths exist for the same wire layout: [`DecodeDepth::Full`]
//! decodes everything, [`DecodeDepth::Metadata`] stops after the mesh
//! headers and treats the bone-count/data-offset slot as reserved bytes.
//! This is the material re-binding path of the original tooling; it is a
//! parameter of one decoder, never a second code path.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use r2_data::{DecodeError, ReadExt, Result};

use crate::geometry::{Material, MeshHeader, MeshRecord, Skin, TriangleSource};
use crate::skeleton::{Bone, Skeleton};
use crate::texture::{TextureRef, TextureResolver};

/// Size of the fixed texture name field
const TEXTURE_NAME_LEN: usize = 260;
/// Size of the fixed mesh/bone name fields
const NAME_LEN: usize = 64;
/// Reserved tail of every mesh header
const MESH_HEADER_RESERVED: usize = 2000;
/// Reserved block between a bone's ids and its names
const BONE_RESERVED: usize = 84;

/// How much of the `.rmb` layout to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeDepth {
    /// Texture table and mesh headers only, for material re-binding
    Metadata,
    /// Everything: skeleton and per-mesh geometry included
    #[default]
    Full,
}

/// Configuration for one decode call
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub depth: DecodeDepth,
    /// Explicit texture directory; overrides the lookup policy
    pub texture_dir: Option<PathBuf>,
    /// Name for the emitted scene and skeleton; defaults to the file
    /// stem when decoding from a path, `"armature"` otherwise
    pub model_name: Option<String>,
}

/// A fully decoded `.rmb` file
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshScene {
    pub name: String,
    pub textures: Vec<TextureRef>,
    pub meshes: Vec<MeshRecord>,
    /// Absent when decoding at [`DecodeDepth::Metadata`]
    pub skeleton: Option<Skeleton>,
}

/// Decoder for `.rmb` skinned-mesh files
///
/// # Examples
///
/// ```no_run
/// use r2_rmb::{DecodeDepth, DecodeOptions, RmbDecoder};
///
/// let decoder = RmbDecoder::with_options(DecodeOptions {
///     depth: DecodeDepth::Full,
///     ..DecodeOptions::default()
/// });
/// let scene = decoder.decode_file("model/m0001.rmb")?;
/// # Ok::<(), r2_rmb::DecodeError>(())
/// ```
#[derive(Debug, Default)]
pub struct RmbDecoder {
    options: DecodeOptions,
}

impl RmbDecoder {
    /// Decoder with default options (full depth, policy-resolved textures)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decode a model file, deriving name and texture directory from
    /// its path
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<MeshScene> {
        let path = path.as_ref();
        let name = self
            .options
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "armature".to_string());
        let resolver = TextureResolver::for_model(path, self.options.texture_dir.as_deref());
        let mut reader = BufReader::new(File::open(path)?);
        self.decode_with(&mut reader, &resolver, name)
    }

    /// Decode from a raw stream
    ///
    /// Texture variants are resolved only against the configured
    /// override directory; there is no model path to apply the
    /// directory policy to.
    pub fn decode<R: Read>(&self, reader: &mut R) -> Result<MeshScene> {
        let resolver = TextureResolver::new(self.options.texture_dir.clone());
        let name = self
            .options
            .model_name
            .clone()
            .unwrap_or_else(|| "armature".to_string());
        self.decode_with(reader, &resolver, name)
    }

    fn decode_with<R: Read>(
        &self,
        reader: &mut R,
        resolver: &TextureResolver,
        name: String,
    ) -> Result<MeshScene> {
        let item_flag = reader.read_i32_le()?; // reserved, kept for alignment
        reader.skip(16)?;
        let texture_count = read_count(reader, "texture count")?;
        let mesh_count = read_count(reader, "mesh count")?;
        let bone_count = match self.options.depth {
            DecodeDepth::Full => {
                let bone_count = read_count(reader, "bone count")?;
                let _data_offset = reader.read_i32_le()?; // unparsed
                bone_count
            }
            DecodeDepth::Metadata => {
                reader.skip(8)?;
                0
            }
        };
        log::debug!(
            "rmb '{name}': flag {item_flag}, {texture_count} textures, \
             {mesh_count} meshes, {bone_count} bones"
        );

        let mut textures = Vec::with_capacity(texture_count);
        for _ in 0..texture_count {
            let base_name = reader.read_fixed_string(TEXTURE_NAME_LEN)?;
            textures.push(resolver.resolve(&base_name));
        }

        let mut meshes = Vec::with_capacity(mesh_count);
        for _ in 0..mesh_count {
            meshes.push(MeshRecord::from_header(read_mesh_header(reader)?));
        }

        if self.options.depth == DecodeDepth::Metadata {
            return Ok(MeshScene {
                name,
                textures,
                meshes,
                skeleton: None,
            });
        }

        let mut bones = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            bones.push(read_bone(reader)?);
        }
        // Linked before the geometry blocks: they resolve bone names
        let skeleton = Skeleton::link(name.clone(), bones);

        for mesh in &mut meshes {
            read_mesh_body(reader, mesh, &skeleton)?;
            bind_material(mesh, &textures);
        }

        Ok(MeshScene {
            name,
            textures,
            meshes,
            skeleton: Some(skeleton),
        })
    }
}

/// Read a declared element count, rejecting negatives
fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let value = reader.read_i32_le()?;
    if value < 0 {
        return Err(DecodeError::Format(format!("negative {what}: {value}")));
    }
    Ok(value as usize)
}

fn read_mesh_header<R: Read>(reader: &mut R) -> Result<MeshHeader> {
    let index = reader.read_i32_le()?;
    reader.skip(4)?;
    let name = reader.read_fixed_string(NAME_LEN)?;
    let parent_bone = reader.read_fixed_string(NAME_LEN)?;
    let has_armature = reader.read_i32_le()? != 0;
    let texture_index = reader.read_i32_le()?;
    let bone_map_count = reader.read_i32_le()?;
    let vertices_count = reader.read_i32_le()?;
    let indices_count = reader.read_i32_le()?;
    if bone_map_count < 0 || vertices_count < 0 || indices_count < 0 {
        return Err(DecodeError::Format(format!(
            "mesh '{name}' declares negative counts: bone map {bone_map_count}, \
             vertices {vertices_count}, indices {indices_count}"
        )));
    }
    reader.skip(MESH_HEADER_RESERVED)?;
    Ok(MeshHeader {
        index,
        name,
        parent_bone,
        has_armature,
        texture_index,
        bone_map_count,
        vertices_count,
        indices_count,
    })
}

fn read_bone<R: Read>(reader: &mut R) -> Result<Bone> {
    let id = reader.read_i32_le()?;
    let parent_id = reader.read_i32_le()?;
    reader.skip(BONE_RESERVED)?;
    let name = reader.read_fixed_string(NAME_LEN)?;
    let parent_name = reader.read_fixed_string(NAME_LEN)?;
    let aux_a = reader.read_mat4_le()?;
    let aux_b = reader.read_mat4_le()?;
    // Only the third matrix is semantically used; its inverse is the
    // bind-pose transform
    let bind = reader.read_mat4_le()?;
    Ok(Bone {
        id,
        parent_id,
        name,
        parent_name: if parent_name.is_empty() {
            None
        } else {
            Some(parent_name)
        },
        bind_matrix: bind.inverse(),
        aux_matrices: [aux_a, aux_b],
        parent: None,
    })
}

fn read_mesh_body<R: Read>(
    reader: &mut R,
    mesh: &mut MeshRecord,
    skeleton: &Skeleton,
) -> Result<()> {
    let bone_map_count = mesh.header.bone_map_count as usize;
    let vertices_count = mesh.header.vertices_count as usize;
    let indices_count = mesh.header.indices_count as usize;

    let mut bone_map = Vec::with_capacity(bone_map_count);
    for _ in 0..bone_map_count {
        bone_map.push(reader.read_u8()?);
    }

    mesh.positions = (0..vertices_count)
        .map(|_| reader.read_vec3_le())
        .collect::<std::io::Result<_>>()?;
    mesh.normals = (0..vertices_count)
        .map(|_| reader.read_vec3_le())
        .collect::<std::io::Result<_>>()?;
    mesh.uvs = (0..vertices_count)
        .map(|_| reader.read_vec2_le())
        .collect::<std::io::Result<_>>()?;

    // Two undecoded per-vertex blocks, 12 bytes each per vertex
    reader.skip(vertices_count * 12)?;
    reader.skip(vertices_count * 12)?;

    if mesh.header.has_armature {
        mesh.skin_weights = Vec::with_capacity(vertices_count);
        for _ in 0..vertices_count {
            mesh.skin_weights.push(vec![
                reader.read_f32_le()?,
                reader.read_f32_le()?,
                reader.read_f32_le()?,
                reader.read_f32_le()?,
            ]);
        }
        mesh.skin_indices = Vec::with_capacity(vertices_count);
        for _ in 0..vertices_count {
            mesh.skin_indices.push(vec![
                reader.read_u8()?,
                reader.read_u8()?,
                reader.read_u8()?,
                reader.read_u8()?,
            ]);
        }
        mesh.skins = vec![Skin {
            bone_map,
            ..Skin::default()
        }];
        mesh.group_names = skeleton.bone_names();
    } else {
        // Rigid mesh: one implicit binding to the parent bone
        mesh.skin_weights = vec![vec![1.0]; vertices_count];
        mesh.skin_indices = vec![vec![0]; vertices_count];
        mesh.skins = vec![Skin {
            bone_map: vec![0],
            ..Skin::default()
        }];
        mesh.group_names = vec![mesh.header.parent_bone.clone()];
    }

    let mut indices = Vec::with_capacity(indices_count);
    for _ in 0..indices_count {
        indices.push(reader.read_u16_le()?);
    }
    mesh.source = TriangleSource::Indices(indices);
    Ok(())
}

/// Bind the mesh's declared texture as its material
///
/// An out-of-range texture index is recoverable: the material stays
/// untextured and a warning is emitted.
fn bind_material(mesh: &mut MeshRecord, textures: &[TextureRef]) {
    let index = mesh.header.texture_index;
    let material = match usize::try_from(index)
        .ok()
        .and_then(|index| textures.get(index))
    {
        Some(texture) => Material::from_texture(texture),
        None => {
            log::warn!(
                "mesh '{}': texture index {index} out of range ({} textures)",
                mesh.header.name,
                textures.len()
            );
            Material::untextured()
        }
    };
    mesh.materials.push(material);
}
