//! Batch conversion of a model and its animation clips
//!
//! Accepts either a model manifest (`.txt`) or a bare `.rmb` mesh. With
//! a manifest, every declared clip is decoded alongside the mesh; clips
//! are independent of each other, so they decode in parallel and a bad
//! clip is logged and skipped rather than failing the batch. The mesh
//! itself is the batch's reason to exist, so a mesh failure is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use r2_rab::{load_action, Action, ActionSink};
use r2_rmb::{sink::MeshSceneSink, DecodeOptions, Manifest, RmbDecoder};

use crate::sink::JsonDirSink;

#[derive(Args)]
pub struct ConvertArgs {
    /// Model manifest (.txt) or mesh (.rmb) to convert
    pub input: PathBuf,

    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only convert clips of these animation types (e.g. walk, A_RUN)
    #[arg(long, value_delimiter = ',')]
    pub anim_types: Vec<String>,

    /// Skip animation clips, convert the mesh only
    #[arg(long)]
    pub mesh_only: bool,

    /// Explicit texture directory
    #[arg(long)]
    pub texture_dir: Option<PathBuf>,
}

pub fn execute(args: ConvertArgs) -> Result<()> {
    let (mesh_path, manifest) = resolve_input(&args.input)?;
    let base_dir = mesh_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let model_stem = mesh_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    // Each batch gets its own subdirectory named after the model
    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| base_dir.clone())
        .join(&model_stem);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let mut sink = JsonDirSink::new(&out_dir);

    let decoder = RmbDecoder::with_options(DecodeOptions {
        texture_dir: args.texture_dir.clone(),
        ..DecodeOptions::default()
    });
    let scene = decoder
        .decode_file(&mesh_path)
        .with_context(|| format!("failed to decode {}", mesh_path.display()))?;
    sink.add_mesh_scene(&scene)?;
    println!(
        "Converted mesh {} ({} meshes, {} textures)",
        mesh_path.display(),
        scene.meshes.len(),
        scene.textures.len()
    );

    if args.mesh_only {
        return Ok(());
    }
    let Some(manifest) = manifest else {
        log::info!("no manifest beside {}, mesh only", mesh_path.display());
        return Ok(());
    };

    let filter = (!args.anim_types.is_empty()).then_some(args.anim_types.as_slice());
    let clip_files = manifest.action_files(filter);
    if clip_files.is_empty() {
        println!("No clips selected");
        return Ok(());
    }

    let progress = ProgressBar::new(clip_files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("invalid progress bar template")
            .progress_chars("##-"),
    );

    let actions: Vec<(PathBuf, r2_rab::Result<Action>)> = clip_files
        .par_iter()
        .map(|file| {
            let path = base_dir.join(file);
            let result = load_action(&path);
            progress.inc(1);
            (path, result)
        })
        .collect();
    progress.finish_and_clear();

    let mut converted = 0usize;
    for (path, result) in actions {
        match result {
            Ok(action) => {
                sink.add_action(&action)?;
                converted += 1;
            }
            Err(err) => {
                log::warn!("skipping clip {}: {err}", path.display());
            }
        }
    }
    println!(
        "Converted {converted}/{} clips to {}",
        clip_files.len(),
        out_dir.display()
    );
    Ok(())
}

/// Resolve the input into a mesh path and an optional manifest
///
/// A `.txt` input is parsed as a manifest and its mesh is resolved
/// relative to it. An `.rmb` input looks for a same-stem manifest
/// beside it, and a missing one means mesh-only conversion.
fn resolve_input(input: &Path) -> Result<(PathBuf, Option<Manifest>)> {
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("txt") => {
            let manifest = read_manifest(input)?;
            let mesh_path = input
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(manifest.mesh_file());
            Ok((mesh_path, Some(manifest)))
        }
        Some("rmb") => {
            let manifest = match Manifest::locate(input) {
                Some(manifest_path) => Some(read_manifest(&manifest_path)?),
                None => None,
            };
            Ok((input.to_path_buf(), manifest))
        }
        _ => bail!(
            "unsupported input {}: expected a .txt manifest or .rmb mesh",
            input.display()
        ),
    }
}

fn read_manifest(path: &Path) -> Result<Manifest> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    Manifest::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
}
