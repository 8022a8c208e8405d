//! Scene-sink seam for decoded mesh data
//!
//! The decoder never talks to a host tool. Anything that wants to turn
//! a [`MeshScene`] into scene objects (a Blender importer, a glTF
//! writer, a JSON dump) implements this trait on its side of the seam.
//! Sink implementations are expected to be stateful and not thread
//! safe; callers serialize scene construction even when decoding ran in
//! parallel.

use crate::decoder::MeshScene;

/// Consumer of decoded mesh scenes
pub trait MeshSceneSink {
    type Error;

    /// Hand a fully decoded scene to the sink
    fn add_mesh_scene(&mut self, scene: &MeshScene) -> std::result::Result<(), Self::Error>;
}
