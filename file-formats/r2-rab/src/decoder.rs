//! Sequential decoder for the `.rab` container
//!
//! Layout: a 9-field `i32` header, one descriptor per bone (name plus
//! the two channel key counts), then a second pass per bone in the same
//! order: raw tick lists for both channels followed by the keyframe
//! payloads. All fields are consumed in wire order even where they are
//! not interpreted, to keep the cursor aligned.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use glam::Mat4;

use r2_data::{DecodeError, ReadExt, Result};

/// Fixed divisor converting raw tick values to frame numbers
///
/// The division truncates; this is lossy by design.
pub const TICKS_PER_FRAME: i32 = 160;

/// Expected value of the first header field
const HEADER_TAG: i32 = 2;
/// Size of the fixed bone name field
const NAME_LEN: usize = 64;

/// One sparse keyframe: a frame number and an absolute transform
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    pub frame: i32,
    pub transform: Mat4,
}

/// Per-bone sparse animation tracks
///
/// The channels are independently sparse: position and rotation key
/// counts may differ for the same bone.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBone {
    pub name: String,
    /// Absolute pure-translation keys
    pub pos_frames: Vec<Keyframe>,
    /// Absolute rotation keys, reconstructed from wire deltas
    pub rot_frames: Vec<Keyframe>,
}

/// One decoded animation clip
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    /// Action name, the part of the file stem after the underscore
    pub name: String,
    /// Skeleton (model) name, the part before the underscore
    pub skeleton: String,
    pub bones: Vec<ActionBone>,
    /// Highest frame number across all channels of all bones
    pub frame_count: i32,
}

/// Decode a `.rab` stream
///
/// `file_stem` is the clip's filename without extension; it must be
/// `<model>_<action>` with exactly one underscore, since the clip is
/// keyed to its skeleton purely by that convention.
pub fn decode_animation<R: Read>(reader: &mut R, file_stem: &str) -> Result<Action> {
    let (skeleton, name) = split_stem(file_stem)?;

    let mut header = [0i32; 9];
    for field in &mut header {
        *field = reader.read_i32_le()?;
    }
    if header[0] != HEADER_TAG || header[1] != 0 {
        log::warn!(
            "rab '{file_stem}': unexpected header tag {}/{}, continuing",
            header[0],
            header[1]
        );
    }
    let bone_count = header[7];
    if bone_count < 0 {
        return Err(DecodeError::Format(format!(
            "negative bone count: {bone_count}"
        )));
    }
    log::debug!("rab '{file_stem}': {bone_count} bones, header {header:?}");

    let mut descriptors = Vec::with_capacity(bone_count as usize);
    for _ in 0..bone_count {
        let name = reader.read_fixed_string(NAME_LEN)?;
        let rot_count = reader.read_i32_le()?;
        let pos_count = reader.read_i32_le()?;
        if rot_count < 0 || pos_count < 0 {
            return Err(DecodeError::Format(format!(
                "bone '{name}' declares negative key counts: rot {rot_count}, pos {pos_count}"
            )));
        }
        descriptors.push((name, rot_count as usize, pos_count as usize));
    }

    let mut bones = Vec::with_capacity(descriptors.len());
    let mut frame_count = 0;
    for (name, rot_count, pos_count) in descriptors {
        let pos_ticks = read_ticks(reader, pos_count)?;
        let rot_ticks = read_ticks(reader, rot_count)?;

        let mut pos_frames = Vec::with_capacity(pos_count);
        for tick in pos_ticks {
            let frame = tick / TICKS_PER_FRAME;
            frame_count = frame_count.max(frame);
            pos_frames.push(Keyframe {
                frame,
                transform: Mat4::from_translation(reader.read_vec3_le()?),
            });
        }

        // Rotation keys are deltas: each key composes onto the previous
        // absolute transform. Position keys above are absolute; the
        // asymmetry is part of the format.
        let mut rot_frames: Vec<Keyframe> = Vec::with_capacity(rot_count);
        for tick in rot_ticks {
            let frame = tick / TICKS_PER_FRAME;
            frame_count = frame_count.max(frame);
            let key = Mat4::from_quat(reader.read_quat_le()?.inverse());
            let transform = match rot_frames.last() {
                Some(previous) => previous.transform * key,
                None => key,
            };
            rot_frames.push(Keyframe { frame, transform });
        }

        bones.push(ActionBone {
            name,
            pos_frames,
            rot_frames,
        });
    }

    Ok(Action {
        name,
        skeleton,
        bones,
        frame_count,
    })
}

/// Load a clip from disk, deriving names from the file stem
pub fn load_action(path: impl AsRef<Path>) -> Result<Action> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DecodeError::Format(format!("not a clip file name: {}", path.display()))
        })?;
    let mut reader = BufReader::new(File::open(path)?);
    decode_animation(&mut reader, &stem)
}

/// Split `<model>_<action>` on its single underscore
fn split_stem(file_stem: &str) -> Result<(String, String)> {
    let mut parts = file_stem.split('_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(model), Some(action), None) if !model.is_empty() && !action.is_empty() => {
            Ok((model.to_string(), action.to_string()))
        }
        _ => Err(DecodeError::Format(format!(
            "clip filename '{file_stem}' is not of the form <model>_<action>"
        ))),
    }
}

fn read_ticks<R: Read>(reader: &mut R, count: usize) -> Result<Vec<i32>> {
    let mut ticks = Vec::with_capacity(count);
    for _ in 0..count {
        ticks.push(reader.read_i32_le()?);
    }
    Ok(ticks)
}
