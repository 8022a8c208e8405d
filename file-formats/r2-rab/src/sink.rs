//! Scene-sink seam for decoded animation actions
//!
//! Mirrors the mesh-scene seam: decoding produces pure data, and
//! whatever builds host-tool actions from it (keyframe insertion, NLA
//! strips, JSON dumps) lives behind this trait.

use crate::decoder::Action;

/// Consumer of decoded animation actions
pub trait ActionSink {
    type Error;

    /// Hand a fully decoded action to the sink
    fn add_action(&mut self, action: &Action) -> std::result::Result<(), Self::Error>;
}
