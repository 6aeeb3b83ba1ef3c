use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tile_splitter::image::{self, DynamicImage, GenericImageView, Rgba, RgbaImage};

fn run_in(dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_split_textures"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn write_atlas(dir: &Path, width: u32, height: u32) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(7);
    let atlas = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |_, _| {
        Rgba(rng.gen::<[u8; 4]>())
    }));
    fs::create_dir_all(dir.join("Assets")).unwrap();
    atlas.save(dir.join("Assets/atlas.png")).unwrap();
    atlas
}

#[test]
fn splits_default_atlas_into_256_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let atlas = write_atlas(dir.path(), 256, 256);

    let output = run_in(dir.path());
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Textures split and saved in 'Assets/split_textures'"
    );

    let output_dir = dir.path().join("Assets/split_textures");
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 256);
    for row in 0..16 {
        for col in 0..16 {
            let tile = image::open(output_dir.join(format!("block_{row}_{col}.png"))).unwrap();
            assert_eq!(tile.dimensions(), (16, 16));
            let expected = atlas.view(col * 16, row * 16, 16, 16).to_image();
            assert_eq!(tile.to_rgba8(), expected);
        }
    }
}

#[test]
fn second_run_leaves_identical_tiles() {
    let dir = tempfile::tempdir().unwrap();
    write_atlas(dir.path(), 256, 256);
    let output_dir = dir.path().join("Assets/split_textures");

    assert!(run_in(dir.path()).status.success());
    let first = fs::read(output_dir.join("block_7_9.png")).unwrap();
    fs::write(output_dir.join("readme.txt"), "unrelated").unwrap();

    assert!(run_in(dir.path()).status.success());
    assert_eq!(fs::read(output_dir.join("block_7_9.png")).unwrap(), first);
    assert_eq!(
        fs::read_to_string(output_dir.join("readme.txt")).unwrap(),
        "unrelated"
    );
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 257);
}

#[test]
fn larger_atlas_only_splits_configured_region() {
    let dir = tempfile::tempdir().unwrap();
    write_atlas(dir.path(), 300, 270);

    assert!(run_in(dir.path()).status.success());
    let output_dir = dir.path().join("Assets/split_textures");
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 256);
    assert!(!output_dir.join("block_16_0.png").exists());
}

#[test]
fn smaller_atlas_is_padded_to_full_grid() {
    let dir = tempfile::tempdir().unwrap();
    let atlas = write_atlas(dir.path(), 128, 128);

    let output = run_in(dir.path());
    assert!(output.status.success());
    let output_dir = dir.path().join("Assets/split_textures");
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 256);

    let inside = image::open(output_dir.join("block_7_7.png")).unwrap();
    assert_eq!(inside.to_rgba8(), atlas.view(112, 112, 16, 16).to_image());
    let outside = image::open(output_dir.join("block_15_15.png")).unwrap();
    assert_eq!(outside.dimensions(), (16, 16));
    assert!(outside.to_rgba8().as_raw().iter().all(|&b| b == 0));
}

#[test]
fn missing_atlas_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_in(dir.path());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("Assets/split_textures").exists());
}
