//! Model manifest (`.txt`) reader
//!
//! A manifest is a small XML document naming the model's `.rmb` mesh
//! (`Mesh/FileName`) and its animation clips (`Animation/Action`
//! elements, each with a `Name` attribute and a `FileName` child). It
//! feeds the batch driver: one mesh path plus a de-duplicated, sorted
//! list of clip paths, optionally filtered by animation type.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use r2_data::{DecodeError, Result};

/// One `Animation/Action` entry of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestAction {
    /// Declared action name, e.g. `A_WALK`
    pub name: Option<String>,
    /// The `.rab` file the action refers to
    pub file_name: String,
}

/// Parsed model manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    mesh_file: String,
    actions: Vec<ManifestAction>,
}

impl Manifest {
    /// Parse a manifest document
    pub fn parse(content: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(content)
            .map_err(|err| DecodeError::Format(format!("manifest is not valid XML: {err}")))?;

        let mesh_file = doc
            .descendants()
            .find(|node| node.has_tag_name("Mesh"))
            .and_then(|mesh| {
                mesh.descendants()
                    .find(|node| node.has_tag_name("FileName"))
            })
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                DecodeError::Format("manifest has no Mesh/FileName element".to_string())
            })?
            .to_string();

        let mut actions = Vec::new();
        for animation in doc.descendants().filter(|n| n.has_tag_name("Animation")) {
            for action in animation.descendants().filter(|n| n.has_tag_name("Action")) {
                let file_name = action
                    .descendants()
                    .find(|node| node.has_tag_name("FileName"))
                    .and_then(|node| node.text())
                    .map(str::trim);
                let Some(file_name) = file_name.filter(|text| !text.is_empty()) else {
                    log::warn!("manifest action without FileName, skipping");
                    continue;
                };
                actions.push(ManifestAction {
                    name: action.attribute("Name").map(str::to_string),
                    file_name: file_name.to_string(),
                });
            }
        }

        Ok(Self { mesh_file, actions })
    }

    /// The `.rmb` file this manifest describes
    pub fn mesh_file(&self) -> &str {
        &self.mesh_file
    }

    /// All declared actions, in document order
    pub fn actions(&self) -> &[ManifestAction] {
        &self.actions
    }

    /// De-duplicated, sorted clip file names
    ///
    /// With a filter, only actions whose declared `Name` matches one of
    /// the requested animation types are kept. Matching is
    /// case-insensitive; each requested type is normalized by ensuring
    /// an `A_` prefix, so `walk` selects `A_WALK`.
    pub fn action_files(&self, anim_types: Option<&[String]>) -> Vec<String> {
        let files: BTreeSet<&str> = match anim_types {
            None => self.actions.iter().map(|a| a.file_name.as_str()).collect(),
            Some(types) => self
                .actions
                .iter()
                .filter(|action| {
                    action
                        .name
                        .as_deref()
                        .is_some_and(|name| matches_anim_type(name, types))
                })
                .map(|a| a.file_name.as_str())
                .collect(),
        };
        files.into_iter().map(str::to_string).collect()
    }

    /// Locate the manifest that sits beside a `.rmb` file
    ///
    /// `m0001.rmb` looks for `m0001.txt` in the same directory. A
    /// missing manifest means "mesh only", not an error.
    pub fn locate(model_path: &Path) -> Option<PathBuf> {
        let manifest = model_path.with_extension("txt");
        manifest.is_file().then_some(manifest)
    }
}

/// Case-insensitive animation-type match with `A_` normalization
fn matches_anim_type(action_name: &str, anim_types: &[String]) -> bool {
    let name = action_name.to_lowercase();
    anim_types.iter().any(|anim_type| {
        let wanted = anim_type.to_lowercase();
        let wanted = if wanted.starts_with("a_") {
            wanted
        } else {
            format!("a_{wanted}")
        };
        name == wanted
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
        <Model>
            <Mesh>
                <FileName>m0001.rmb</FileName>
            </Mesh>
            <Animation>
                <Action Name="A_WALK">
                    <FileName>m0001_walk.rab</FileName>
                </Action>
                <Action Name="A_RUN">
                    <FileName>m0001_run.rab</FileName>
                </Action>
                <Action Name="A_RUN">
                    <FileName>m0001_run.rab</FileName>
                </Action>
            </Animation>
        </Model>
    "#;

    #[test]
    fn test_extracts_mesh_and_sorted_unique_actions() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.mesh_file(), "m0001.rmb");
        assert_eq!(
            manifest.action_files(None),
            vec!["m0001_run.rab".to_string(), "m0001_walk.rab".to_string()]
        );
    }

    #[test]
    fn test_filter_by_animation_type() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let types = vec!["walk".to_string()];
        assert_eq!(
            manifest.action_files(Some(&types)),
            vec!["m0001_walk.rab".to_string()]
        );
    }

    #[test]
    fn test_filter_accepts_prefixed_types() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let types = vec!["A_Run".to_string()];
        assert_eq!(
            manifest.action_files(Some(&types)),
            vec!["m0001_run.rab".to_string()]
        );
    }

    #[test]
    fn test_missing_mesh_filename_is_format_error() {
        let result = Manifest::parse("<Model><Animation/></Model>");
        assert!(matches!(result, Err(DecodeError::Format(_))));
    }

    #[test]
    fn test_no_animation_section_yields_no_actions() {
        let manifest =
            Manifest::parse("<Model><Mesh><FileName>m.rmb</FileName></Mesh></Model>").unwrap();
        assert!(manifest.action_files(None).is_empty());
    }

    #[test]
    fn test_invalid_xml_is_format_error() {
        assert!(matches!(
            Manifest::parse("<Model><unclosed"),
            Err(DecodeError::Format(_))
        ));
    }
}
