//! Texture reference resolution for RMB models
//!
//! The texture table of an `.rmb` stores only base names such as
//! `m0001.dds`. Specular and normal variants are sibling files by
//! naming convention (`m0001_sp.dds`, `m0001_n.dds`) and are looked up
//! case-insensitively against the texture directory's actual entries,
//! since the archives mix casings freely. A missing variant is simply
//! absent, never an error.

use std::fs;
use std::path::{Path, PathBuf};

/// Resolved file paths for one texture table entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureRef {
    /// Diffuse map, the base name joined onto the texture directory
    pub diffuse: PathBuf,
    /// Specular map (`_sp` suffix), if such a sibling exists
    pub specular: Option<PathBuf>,
    /// Normal map (`_n` suffix), if such a sibling exists
    pub normal: Option<PathBuf>,
}

/// Maps base texture names to [`TextureRef`]s against one directory
///
/// The directory listing is read once at construction and cached, so a
/// resolver can be shared read-only across concurrent decodes of
/// sibling files.
#[derive(Debug, Clone)]
pub struct TextureResolver {
    dir: Option<PathBuf>,
    /// Cached file names of `dir`, in directory order
    listing: Vec<String>,
}

impl TextureResolver {
    /// Create a resolver for an explicit texture directory
    ///
    /// With `None` the base names resolve as bare relative paths and no
    /// variant lookup happens (nothing to scan).
    pub fn new(dir: Option<PathBuf>) -> Self {
        let listing = dir.as_deref().map(read_listing).unwrap_or_default();
        Self { dir, listing }
    }

    /// Create a resolver for a model file, applying the directory policy
    ///
    /// Preference order: the explicit `override_dir` when it exists, a
    /// `texture` subdirectory beside the model, a `texture` sibling of
    /// the nearest ancestor directory literally named `model`, and
    /// finally the model's own directory.
    pub fn for_model(model_path: &Path, override_dir: Option<&Path>) -> Self {
        if let Some(dir) = override_dir {
            if dir.is_dir() {
                return Self::new(Some(dir.to_path_buf()));
            }
            log::warn!(
                "texture directory override {} does not exist, falling back",
                dir.display()
            );
        }

        let model_dir = model_path.parent().unwrap_or_else(|| Path::new("."));

        let beside = model_dir.join("texture");
        if beside.is_dir() {
            return Self::new(Some(beside));
        }

        for ancestor in model_dir.ancestors() {
            if ancestor.file_name().is_some_and(|n| n == "model") {
                if let Some(parent) = ancestor.parent() {
                    let sibling = parent.join("texture");
                    if sibling.is_dir() {
                        return Self::new(Some(sibling));
                    }
                }
            }
        }

        Self::new(Some(model_dir.to_path_buf()))
    }

    /// The directory this resolver scans, if any
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Resolve a base name from the texture table
    ///
    /// The diffuse path is the base name as-is; it is not existence
    /// checked, so a missing diffuse file surfaces downstream.
    pub fn resolve(&self, base_name: &str) -> TextureRef {
        let diffuse = match &self.dir {
            Some(dir) => dir.join(base_name),
            None => PathBuf::from(base_name),
        };
        TextureRef {
            diffuse,
            specular: self.find_variant(base_name, "_sp"),
            normal: self.find_variant(base_name, "_n"),
        }
    }

    /// Look for a `<stem><suffix>.<ext>` sibling, case-insensitively
    ///
    /// First match in directory order wins; the returned path carries
    /// the directory entry's actual casing.
    fn find_variant(&self, base_name: &str, suffix: &str) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?;
        let wanted = variant_name(base_name, suffix).to_lowercase();
        self.listing
            .iter()
            .find(|entry| entry.to_lowercase() == wanted)
            .map(|entry| dir.join(entry))
    }
}

/// Insert `suffix` before the extension of `base_name`
fn variant_name(base_name: &str, suffix: &str) -> String {
    let path = Path::new(base_name);
    let stem = path
        .file_stem()
        .map_or_else(|| base_name.to_string(), |s| s.to_string_lossy().into_owned());
    match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    }
}

fn read_listing(dir: &Path) -> Vec<String> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(err) => {
            log::warn!("cannot list texture directory {}: {err}", dir.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_resolves_existing_variants() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "tex.dds");
        touch(tmp.path(), "tex_sp.dds");
        touch(tmp.path(), "tex_n.dds");

        let resolver = TextureResolver::new(Some(tmp.path().to_path_buf()));
        let texture = resolver.resolve("tex.dds");
        assert_eq!(texture.diffuse, tmp.path().join("tex.dds"));
        assert_eq!(texture.specular, Some(tmp.path().join("tex_sp.dds")));
        assert_eq!(texture.normal, Some(tmp.path().join("tex_n.dds")));
    }

    #[test]
    fn test_missing_variants_resolve_to_none() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "tex.dds");

        let resolver = TextureResolver::new(Some(tmp.path().to_path_buf()));
        let texture = resolver.resolve("tex.dds");
        assert_eq!(texture.specular, None);
        assert_eq!(texture.normal, None);
    }

    #[test]
    fn test_variant_match_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "TEX_SP.DDS");

        let resolver = TextureResolver::new(Some(tmp.path().to_path_buf()));
        let texture = resolver.resolve("tex.dds");
        // Actual casing of the directory entry is preserved
        assert_eq!(texture.specular, Some(tmp.path().join("TEX_SP.DDS")));
    }

    #[test]
    fn test_no_directory_keeps_bare_name() {
        let resolver = TextureResolver::new(None);
        let texture = resolver.resolve("tex.dds");
        assert_eq!(texture.diffuse, PathBuf::from("tex.dds"));
        assert_eq!(texture.specular, None);
    }

    #[test]
    fn test_for_model_prefers_texture_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("texture")).unwrap();
        let model = tmp.path().join("m0001.rmb");

        let resolver = TextureResolver::for_model(&model, None);
        assert_eq!(resolver.dir(), Some(tmp.path().join("texture").as_path()));
    }

    #[test]
    fn test_for_model_finds_texture_sibling_of_model_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("model/zone1")).unwrap();
        std::fs::create_dir(tmp.path().join("texture")).unwrap();
        let model = tmp.path().join("model/zone1/m0001.rmb");

        let resolver = TextureResolver::for_model(&model, None);
        assert_eq!(resolver.dir(), Some(tmp.path().join("texture").as_path()));
    }

    #[test]
    fn test_for_model_falls_back_to_model_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let model = tmp.path().join("m0001.rmb");

        let resolver = TextureResolver::for_model(&model, None);
        assert_eq!(resolver.dir(), Some(tmp.path()));
    }

    #[test]
    fn test_variant_name_insertion() {
        assert_eq!(variant_name("tex.dds", "_sp"), "tex_sp.dds");
        assert_eq!(variant_name("a.b.dds", "_n"), "a.b_n.dds");
        assert_eq!(variant_name("noext", "_sp"), "noext_sp");
    }
}
