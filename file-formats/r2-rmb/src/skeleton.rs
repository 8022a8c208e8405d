//! Bind skeleton assembly for RMB models
//!
//! The bone table is read in file order and linked in a second pass,
//! so a bone may name a parent that appears later in the table. An
//! unresolvable parent is a recoverable condition: the bone becomes an
//! implicit root and a warning is logged.

use glam::Mat4;

/// One entry of the RMB bone table
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    /// Declared bone id
    pub id: i32,
    /// Declared parent table index; -1 means none
    pub parent_id: i32,
    /// Bone name; empty on the wire gets replaced by the table index
    pub name: String,
    /// Declared parent name, if any
    pub parent_name: Option<String>,
    /// Inverse of the third per-bone matrix: the bind-pose transform
    pub bind_matrix: Mat4,
    /// The first two per-bone matrices, kept verbatim. Their purpose is
    /// undocumented; they are never interpreted, only carried.
    pub aux_matrices: [Mat4; 2],
    /// Resolved parent index after linking; `None` for roots
    pub parent: Option<usize>,
}

/// A parent-linked bone hierarchy with bind transforms
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    /// Skeleton name, conventionally the model file stem
    pub name: String,
    /// Bones in table order; identity is the index in this list
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Build a skeleton from a fully read bone table
    ///
    /// Parents resolve by `parent_id` when it is not -1, otherwise by
    /// `parent_name` against the whole table. Bones whose parent cannot
    /// be resolved become roots.
    pub fn link(name: impl Into<String>, mut bones: Vec<Bone>) -> Self {
        for (index, bone) in bones.iter_mut().enumerate() {
            if bone.name.is_empty() {
                bone.name = index.to_string();
            }
        }

        let names: Vec<String> = bones.iter().map(|b| b.name.clone()).collect();
        for (index, bone) in bones.iter_mut().enumerate() {
            bone.parent = if bone.parent_id != -1 {
                let parent = bone.parent_id as usize;
                if bone.parent_id >= 0 && parent < names.len() {
                    Some(parent)
                } else {
                    log::warn!(
                        "bone '{}' declares parent id {} outside the table, treating as root",
                        bone.name,
                        bone.parent_id
                    );
                    None
                }
            } else if let Some(parent_name) = bone.parent_name.as_deref() {
                let found = names.iter().position(|n| n == parent_name);
                if found.is_none() {
                    log::warn!(
                        "bone '{}' declares unknown parent '{}', treating as root",
                        bone.name,
                        parent_name
                    );
                }
                found
            } else {
                None
            };
            // A bone cannot parent itself
            if bone.parent == Some(index) {
                log::warn!("bone '{}' declares itself as parent, treating as root", bone.name);
                bone.parent = None;
            }
        }

        Self {
            name: name.into(),
            bones,
        }
    }

    /// Bone names in table order
    pub fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }

    /// Find a bone's table index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Indices of all bones without a resolved parent
    pub fn roots(&self) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}
