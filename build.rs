use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use fs_extra::dir::CopyOptions;

/// Mirror `assets/` (models/scene.gltf, Tree/scene.gltf and their textures)
/// into `OUT_DIR/assets`. The binary falls back to that copy
/// (`config::BUILT_ASSETS`) when it is started outside the crate directory.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.is_dir() {
        println!("cargo:warning=no assets/ directory, the room will render without models");
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut options = CopyOptions::new();
    options.overwrite = true;
    fs_extra::copy_items(&[&assets], &out_dir, &options)
        .with_context(|| format!("could not copy {} to {out_dir}", assets.display()))?;
    Ok(())
}
