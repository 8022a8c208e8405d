//! Model manifest command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use r2_rmb::Manifest;

#[derive(Subcommand)]
pub enum ManifestCommands {
    /// Display the mesh and clip files a manifest declares
    Info {
        /// Path to the manifest (.txt) file
        file: PathBuf,

        /// Only list clips of these animation types (e.g. walk, A_RUN)
        #[arg(long, value_delimiter = ',')]
        anim_types: Vec<String>,
    },
}

pub fn execute(command: ManifestCommands) -> Result<()> {
    match command {
        ManifestCommands::Info { file, anim_types } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let manifest = Manifest::parse(&content)
                .with_context(|| format!("failed to parse {}", file.display()))?;

            println!("Mesh: {}", manifest.mesh_file());

            let filter = (!anim_types.is_empty()).then_some(anim_types.as_slice());
            let clips = manifest.action_files(filter);
            println!("Clips: {}", clips.len());
            for clip in clips {
                println!("  {clip}");
            }
            Ok(())
        }
    }
}
