use anyhow::Result;
use env_logger::{Builder, Env};
use log::info;
use std::env;
use tile_splitter::TileSplitter;

const ATLAS_PATH: &str = "Assets/atlas.png";
const OUTPUT_DIR: &str = "Assets/split_textures";

const ATLAS_WIDTH: u32 = 256;
const ATLAS_HEIGHT: u32 = 256;
const BLOCK_SIZE: u32 = 16;

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    let env = Env::default();
    Builder::from_env(env).format_timestamp_millis().init();

    info!("Start to load atlas");
    let report = TileSplitter::from_path(ATLAS_PATH)?
        .dimensions(ATLAS_WIDTH, ATLAS_HEIGHT)
        .block_size(BLOCK_SIZE)
        .split_into(OUTPUT_DIR)?;

    println!(
        "Textures split and saved in '{}'",
        report.output_dir.display()
    );
    Ok(())
}
