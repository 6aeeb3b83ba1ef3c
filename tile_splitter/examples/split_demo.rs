use env_logger::{Builder, Env};
use std::env;
use tile_splitter::TileSplitter;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "debug");
    }
    let env = Env::default();
    Builder::from_env(env).format_timestamp_millis().init();

    // 4x4 checkerboard of 16px blocks, each block shaded by its position
    let mut bytes = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let (col, row) = (x / 16, y / 16);
            let shade = if (col + row) % 2 == 0 { 255 } else { 64 };
            bytes.extend_from_slice(&[shade, (col * 60) as u8, (row * 60) as u8, 255]);
        }
    }

    let report = TileSplitter::from_rgba8(WIDTH, HEIGHT, &bytes)
        .expect("Failed to build atlas")
        .split_into("tiles")
        .expect("Failed to split atlas");

    for file in report.files.iter() {
        println!("{}", file.display());
    }
}
