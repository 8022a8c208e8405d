//! RMB mesh file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use r2_rmb::{sink::MeshSceneSink, DecodeDepth, DecodeOptions, MeshScene, RmbDecoder, Skeleton};

use crate::sink::JsonDirSink;

#[derive(Subcommand)]
pub enum RmbCommands {
    /// Display information about an RMB mesh file
    Info {
        /// Path to the RMB file
        file: PathBuf,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Explicit texture directory
        #[arg(long)]
        texture_dir: Option<PathBuf>,

        /// Decode texture/mesh metadata only, skipping geometry
        #[arg(long)]
        metadata_only: bool,
    },

    /// Decode an RMB file and write the scene as JSON
    Dump {
        /// Path to the RMB file
        file: PathBuf,

        /// Output directory (defaults to the file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Explicit texture directory
        #[arg(long)]
        texture_dir: Option<PathBuf>,
    },
}

pub fn execute(command: RmbCommands) -> Result<()> {
    match command {
        RmbCommands::Info {
            file,
            detailed,
            texture_dir,
            metadata_only,
        } => {
            let depth = if metadata_only {
                DecodeDepth::Metadata
            } else {
                DecodeDepth::Full
            };
            let scene = decode(&file, depth, texture_dir)?;
            print_info(&scene, detailed);
            Ok(())
        }
        RmbCommands::Dump {
            file,
            output,
            texture_dir,
        } => {
            let scene = decode(&file, DecodeDepth::Full, texture_dir)?;
            let out_dir = output
                .or_else(|| file.parent().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let mut sink = JsonDirSink::new(out_dir);
            sink.add_mesh_scene(&scene)?;
            println!("Wrote {}.json to {}", scene.name, sink.out_dir().display());
            Ok(())
        }
    }
}

fn decode(file: &PathBuf, depth: DecodeDepth, texture_dir: Option<PathBuf>) -> Result<MeshScene> {
    let decoder = RmbDecoder::with_options(DecodeOptions {
        depth,
        texture_dir,
        model_name: None,
    });
    decoder
        .decode_file(file)
        .with_context(|| format!("failed to decode {}", file.display()))
}

fn print_info(scene: &MeshScene, detailed: bool) {
    println!("Model: {}", scene.name);

    println!("Textures: {}", scene.textures.len());
    for (index, texture) in scene.textures.iter().enumerate() {
        let mut variants = Vec::new();
        if texture.specular.is_some() {
            variants.push("specular");
        }
        if texture.normal.is_some() {
            variants.push("normal");
        }
        let variants = if variants.is_empty() {
            String::new()
        } else {
            format!(" (+{})", variants.join(", "))
        };
        println!("  [{index}] {}{variants}", texture.diffuse.display());
    }

    println!("Meshes: {}", scene.meshes.len());
    for mesh in &scene.meshes {
        let triangles = mesh.triangulate().len();
        println!(
            "  {}: parent '{}', {} vertices, {} triangles, armature: {}",
            mesh.header.name,
            mesh.header.parent_bone,
            mesh.header.vertices_count,
            triangles,
            mesh.header.has_armature,
        );
        if detailed {
            for (id, material) in mesh.materials.iter().enumerate() {
                println!(
                    "    material {id}: diffuse {:?}, range {:?}..+{:?}",
                    material.diffuse.as_ref().map(|p| p.display().to_string()),
                    material.id_start,
                    material.id_count,
                );
            }
        }
    }

    match &scene.skeleton {
        Some(skeleton) => {
            println!("Bones: {}", skeleton.bones.len());
            if detailed {
                for root in skeleton.roots() {
                    print_bone_tree(skeleton, root, 1);
                }
            }
        }
        None => println!("Bones: not decoded (metadata only)"),
    }
}

fn print_bone_tree(skeleton: &Skeleton, index: usize, depth: usize) {
    println!("{}{}", "  ".repeat(depth), skeleton.bones[index].name);
    for (child, _) in skeleton
        .bones
        .iter()
        .enumerate()
        .filter(|(_, bone)| bone.parent == Some(index))
    {
        print_bone_tree(skeleton, child, depth + 1);
    }
}
