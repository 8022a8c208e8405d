//! JSON scene sink
//!
//! Implements both sink seams by writing one pretty-printed JSON
//! document per decoded item into a target directory. Scene files are
//! named after the model, action files after `<skeleton>_<action>`, so
//! a converted batch mirrors the source file names.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use r2_rab::{Action, ActionSink};
use r2_rmb::{sink::MeshSceneSink, MeshScene};

pub struct JsonDirSink {
    out_dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let path = self.out_dir.join(file_name);
        let file = File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), value)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(path)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl MeshSceneSink for JsonDirSink {
    type Error = anyhow::Error;

    fn add_mesh_scene(&mut self, scene: &MeshScene) -> Result<()> {
        let path = self.write_json(&format!("{}.json", scene.name), scene)?;
        log::info!("wrote mesh scene {}", path.display());
        Ok(())
    }
}

impl ActionSink for JsonDirSink {
    type Error = anyhow::Error;

    fn add_action(&mut self, action: &Action) -> Result<()> {
        let file_name = format!("{}_{}.json", action.skeleton, action.name);
        let path = self.write_json(&file_name, action)?;
        log::info!("wrote action {}", path.display());
        Ok(())
    }
}
