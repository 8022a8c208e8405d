//! RAB animation clip command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use r2_rab::{load_action, Action, ActionSink};

use crate::sink::JsonDirSink;

#[derive(Subcommand)]
pub enum RabCommands {
    /// Display information about a RAB animation clip
    Info {
        /// Path to the RAB file
        file: PathBuf,

        /// Show per-bone channel details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Decode a RAB clip and write it as JSON
    Dump {
        /// Path to the RAB file
        file: PathBuf,

        /// Output directory (defaults to the file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn execute(command: RabCommands) -> Result<()> {
    match command {
        RabCommands::Info { file, detailed } => {
            let action = load(&file)?;
            print_info(&action, detailed);
            Ok(())
        }
        RabCommands::Dump { file, output } => {
            let action = load(&file)?;
            let out_dir = output
                .or_else(|| file.parent().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let mut sink = JsonDirSink::new(out_dir);
            sink.add_action(&action)?;
            println!(
                "Wrote {}_{}.json to {}",
                action.skeleton,
                action.name,
                sink.out_dir().display()
            );
            Ok(())
        }
    }
}

fn load(file: &PathBuf) -> Result<Action> {
    load_action(file).with_context(|| format!("failed to decode {}", file.display()))
}

fn print_info(action: &Action, detailed: bool) {
    println!("Action: {}", action.name);
    println!("Skeleton: {}", action.skeleton);
    println!("Frames: {}", action.frame_count);
    println!("Bones: {}", action.bones.len());
    if detailed {
        for bone in &action.bones {
            println!(
                "  {}: {} position keys, {} rotation keys",
                bone.name,
                bone.pos_frames.len(),
                bone.rot_frames.len()
            );
        }
    }
}
