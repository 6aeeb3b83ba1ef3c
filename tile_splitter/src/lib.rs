//! The Tile Splitter library cuts a texture atlas into uniform square tiles and writes each tile
//! to its own image file. It provides one main entry point:
//!
//! - [`TileSplitter`] owns the decoded atlas and splits it with [`TileSplitter::split_into`].
//!     This is the type you normally want to use
//! - [`GridLayout`] describes how a given atlas size divides into rows and columns of
//!     `block_size` pixels, including the remainder strips that are left out
//! - [`Tile`] is a single cropped cell, named after its row and column

use anyhow::{anyhow, Context, Result};
use image::{
    imageops, DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Pixel, RgbaImage,
};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub use image;

/// Edge length of a tile when none is configured
pub const DEFAULT_BLOCK_SIZE: u32 = 16;
/// Extension of the written tiles when none is configured. The image format is inferred from it.
pub const DEFAULT_EXTENSION: &str = "png";

/// Pixel bounding box of a tile inside the atlas. `right` and `lower` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileBounds {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl TileBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.lower - self.upper
    }
}

/// The grid of square cells laid over an atlas of a given size.
///
/// Columns and rows are computed with truncating division, so an atlas whose width or height is
/// not a multiple of the block size leaves a strip of pixels on the right or bottom edge which is
/// not part of any tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridLayout {
    /// Edge length of every tile in pixels
    pub block_size: u32,
    /// Number of tiles along the x-axis
    pub columns: u32,
    /// Number of tiles along the y-axis
    pub rows: u32,
    /// Width of the strip on the right edge which is left out
    pub remainder_width: u32,
    /// Height of the strip on the bottom edge which is left out
    pub remainder_height: u32,
}

impl GridLayout {
    pub fn new(width: u32, height: u32, block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(anyhow!("block size must be positive"));
        }
        Ok(GridLayout {
            block_size,
            columns: width / block_size,
            rows: height / block_size,
            remainder_width: width % block_size,
            remainder_height: height % block_size,
        })
    }

    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Returns `true` if the block size divides both atlas dimensions
    pub fn is_exact(&self) -> bool {
        self.remainder_width == 0 && self.remainder_height == 0
    }

    /// Returns the bounding box of the cell at `row` and `col`, or `None` if the cell is outside
    /// the grid
    pub fn bounds(&self, row: u32, col: u32) -> Option<TileBounds> {
        if row < self.rows && col < self.columns {
            Some(self.cell_bounds(row, col))
        } else {
            None
        }
    }

    /// `row` and `col` must be inside the grid
    fn cell_bounds(&self, row: u32, col: u32) -> TileBounds {
        let left = col * self.block_size;
        let upper = row * self.block_size;
        TileBounds {
            left,
            upper,
            right: left + self.block_size,
            lower: upper + self.block_size,
        }
    }

    /// Iterates over all `(row, col)` pairs, row by row
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |col| (row, col)))
    }
}

/// A single cell cropped out of the atlas
#[derive(Debug, Clone)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    pub bounds: TileBounds,
    pub image: DynamicImage,
}

impl Tile {
    /// The file name of the tile, e.g. `block_3_7.png`
    pub fn file_name(&self, extension: &str) -> String {
        format!("block_{}_{}.{}", self.row, self.col, extension)
    }

    /// Writes the tile into `dir`, replacing any existing file with the same name. Returns the
    /// path of the written file.
    pub fn save_in(&self, dir: &Path, extension: &str, format: ImageFormat) -> Result<PathBuf> {
        let path = dir.join(self.file_name(extension));
        self.image
            .save_with_format(&path, format)
            .with_context(|| format!("failed to save tile {}", path.display()))?;
        Ok(path)
    }
}

/// What a call to [`TileSplitter::split_into`] wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// The directory the tiles were written to
    pub output_dir: PathBuf,
    /// The grid which was cut out of the atlas
    pub layout: GridLayout,
    /// Written files in row-major order
    pub files: Vec<PathBuf>,
}

/// Splits an atlas into square tiles
///
/// The grid is laid over the configured atlas `dimensions`, or over the whole decoded image if
/// none are given. Each cell is cropped with the colour type of the atlas and written as
/// `block_<row>_<col>.<extension>`.
#[derive(Debug)]
pub struct TileSplitter {
    /// The decoded atlas
    atlas: DynamicImage,
    /// Edge length of every tile
    block_size: u32,
    /// Optional width and height of the region of the atlas which is split
    dimensions: Option<(u32, u32)>,
    /// Extension of the written files
    extension: String,
}

impl TileSplitter {
    pub fn new(atlas: DynamicImage) -> Self {
        TileSplitter {
            atlas,
            block_size: DEFAULT_BLOCK_SIZE,
            dimensions: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn from_rgba8(width: u32, height: u32, image_bytes: &[u8]) -> Result<Self> {
        let atlas = DynamicImage::ImageRgba8(
            RgbaImage::from_raw(width, height, image_bytes.to_vec())
                .ok_or_else(|| anyhow!("Failed to create image from raw bytes"))?,
        );
        Ok(TileSplitter::new(atlas))
    }

    /// Creates a new `TileSplitter` from the image file at `atlas_path`. Fails if the file does
    /// not exist, cannot be read or is not a decodable image.
    pub fn from_path(atlas_path: impl AsRef<Path>) -> Result<Self> {
        let atlas_path = atlas_path.as_ref();
        let atlas = image::open(atlas_path)
            .with_context(|| format!("failed to load atlas {}", atlas_path.display()))?;
        info!(
            "loaded atlas from {} with dimensions {}x{}",
            atlas_path.display(),
            atlas.width(),
            atlas.height()
        );
        Ok(TileSplitter::new(atlas))
    }

    pub fn block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn atlas(&self) -> &DynamicImage {
        &self.atlas
    }

    /// Returns the grid laid over the atlas. Configured dimensions may exceed the loaded image;
    /// cells reaching past its edges are padded when cropped.
    pub fn layout(&self) -> Result<GridLayout> {
        let (width, height) = self.dimensions.unwrap_or_else(|| self.atlas.dimensions());
        let (atlas_width, atlas_height) = self.atlas.dimensions();
        if width > atlas_width || height > atlas_height {
            debug!(
                "atlas dimensions {}x{} exceed the loaded image {}x{}, padding with zeros",
                width, height, atlas_width, atlas_height
            );
        }
        GridLayout::new(width, height, self.block_size)
    }

    /// Crops the cell at `row` and `col` out of the atlas, or returns `None` if the cell is
    /// outside `layout`
    pub fn tile(&self, layout: &GridLayout, row: u32, col: u32) -> Option<Tile> {
        let bounds = layout.bounds(row, col)?;
        Some(self.crop_cell(row, col, bounds))
    }

    fn crop_cell(&self, row: u32, col: u32, bounds: TileBounds) -> Tile {
        let (atlas_width, atlas_height) = self.atlas.dimensions();
        let width = bounds.right.min(atlas_width).saturating_sub(bounds.left);
        let height = bounds.lower.min(atlas_height).saturating_sub(bounds.upper);
        let part = self.atlas.crop_imm(bounds.left, bounds.upper, width, height);
        let image = if width == bounds.width() && height == bounds.height() {
            part
        } else {
            pad(part, bounds.width(), bounds.height())
        };
        Tile {
            row,
            col,
            bounds,
            image,
        }
    }

    /// Crops every cell and writes it into `output_dir`. The directory and its missing parents
    /// are created first. Stops at the first failure; tiles written up to that point stay.
    pub fn split_into(&self, output_dir: impl AsRef<Path>) -> Result<SplitReport> {
        let output_dir = output_dir.as_ref();
        let layout = self.layout()?;
        let format = ImageFormat::from_extension(&self.extension)
            .ok_or_else(|| anyhow!("unknown image extension '{}'", self.extension))?;

        fs::create_dir_all(output_dir).with_context(|| {
            format!("failed to create output directory {}", output_dir.display())
        })?;

        info!(
            "start splitting atlas into {}x{} tiles of {}px",
            layout.columns, layout.rows, layout.block_size
        );
        if !layout.is_exact() {
            debug!(
                "leaving out {}px on the right and {}px at the bottom",
                layout.remainder_width, layout.remainder_height
            );
        }

        let mut files = Vec::with_capacity(layout.tile_count());
        for (row, col) in layout.cells() {
            let tile = self.crop_cell(row, col, layout.cell_bounds(row, col));
            let path = tile.save_in(output_dir, &self.extension, format)?;
            debug!("saved tile {row}_{col} to {}", path.display());
            files.push(path);
        }

        info!("wrote {} tiles to {}", files.len(), output_dir.display());
        Ok(SplitReport {
            output_dir: output_dir.to_path_buf(),
            layout,
            files,
        })
    }
}

/// Places `part` in the top left corner of a zeroed `width`x`height` image of the same colour type
fn pad(part: DynamicImage, width: u32, height: u32) -> DynamicImage {
    fn pad_buffer<P: Pixel>(
        part: &ImageBuffer<P, Vec<P::Subpixel>>,
        width: u32,
        height: u32,
    ) -> ImageBuffer<P, Vec<P::Subpixel>> {
        let mut padded = ImageBuffer::new(width, height);
        imageops::replace(&mut padded, part, 0, 0);
        padded
    }

    match part {
        DynamicImage::ImageLuma8(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageLumaA8(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgb8(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgba8(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageLuma16(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageLumaA16(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgb16(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgba16(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgb32F(p) => pad_buffer(&p, width, height).into(),
        DynamicImage::ImageRgba32F(p) => pad_buffer(&p, width, height).into(),
        other => {
            let mut padded = DynamicImage::new(width, height, other.color());
            imageops::replace(&mut padded, &other, 0, 0);
            padded
        }
    }
}
