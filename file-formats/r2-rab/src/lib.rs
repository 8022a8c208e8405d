//! Decoder for R2 Online RAB skeletal-animation clips.
//!
//! A `.rab` file stores one action for the skeleton of its sibling
//! `.rmb` model, keyed by filename convention: `m0001_walk.rab` animates
//! the `m0001` skeleton with the `walk` action. Each bone carries two
//! independently sparse channels: absolute position keys and chained
//! (delta-encoded) rotation keys. The decoder converts raw tick values
//! to frame numbers with the fixed timebase and recovers absolute
//! rotations by cumulative composition; see [`decoder`] for the exact
//! rules.
//!
//! # Examples
//!
//! ```no_run
//! let action = r2_rab::load_action("m0001_walk.rab")?;
//! println!(
//!     "{} on {}: {} bones over {} frames",
//!     action.name,
//!     action.skeleton,
//!     action.bones.len(),
//!     action.frame_count
//! );
//! # Ok::<(), r2_rab::DecodeError>(())
//! ```

pub mod decoder;
pub mod sink;

pub use decoder::{decode_animation, load_action, Action, ActionBone, Keyframe, TICKS_PER_FRAME};
pub use r2_data::{DecodeError, Result};
pub use sink::ActionSink;
