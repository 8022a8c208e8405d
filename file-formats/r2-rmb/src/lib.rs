//! Decoder for R2 Online RMB skinned-mesh assets.
//!
//! An `.rmb` container holds a texture table, a set of mesh records, a
//! bind skeleton, and per-mesh vertex/index/skin streams, all laid out
//! strictly sequentially with no random access. This crate turns that
//! byte stream into pure scene data: [`MeshScene`] with resolved
//! [`texture::TextureRef`]s, reconstructed triangles with material-id
//! assignment, per-vertex skin influences, and a parent-linked
//! [`skeleton::Skeleton`].
//!
//! The companion `.txt` manifest that names a mesh's animation clips is
//! handled by [`manifest`]. Host-tool object construction (Blender
//! scenes, FBX export and the like) is deliberately outside this crate;
//! consumers implement [`sink::MeshSceneSink`] instead.
//!
//! # Examples
//!
//! ```no_run
//! use r2_rmb::RmbDecoder;
//!
//! let decoder = RmbDecoder::new();
//! let scene = decoder.decode_file("m0001.rmb")?;
//! println!(
//!     "{}: {} textures, {} meshes",
//!     scene.name,
//!     scene.textures.len(),
//!     scene.meshes.len()
//! );
//! # Ok::<(), r2_rmb::DecodeError>(())
//! ```

pub mod decoder;
pub mod geometry;
pub mod manifest;
pub mod sink;
pub mod skeleton;
pub mod texture;

pub use decoder::{DecodeDepth, DecodeOptions, MeshScene, RmbDecoder};
pub use geometry::{Influence, Material, MeshHeader, MeshRecord, Skin, Triangle, TriangleSource};
pub use manifest::Manifest;
pub use r2_data::{DecodeError, Result};
pub use skeleton::{Bone, Skeleton};
pub use texture::{TextureRef, TextureResolver};
