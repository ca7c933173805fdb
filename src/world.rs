use macroquad::file::load_string;
use macroquad::prelude::*;
use serde::Deserialize;

use crate::helpers::asset_path;

pub const CHUNK_SIZE: usize = 32;

#[derive(Deserialize)]
pub struct WorldConfig {
    pub map_width: u32,
    pub map_height: u32,
    #[serde(default = "default_spawn_x")]
    pub spawn_x: f32,
    #[serde(default = "default_spawn_y")]
    pub spawn_y: f32,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
}

fn default_spawn_x() -> f32 {
    450.0
}

fn default_spawn_y() -> f32 {
    400.0
}

fn default_viewport_width() -> f32 {
    1900.0
}

fn default_viewport_height() -> f32 {
    1000.0
}

impl WorldConfig {
    pub async fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let json = load_string(&asset_path(path)).await?;
        let config: WorldConfig = serde_json::from_str(&json)?;
        if config.map_width == 0 || config.map_height == 0 {
            return Err(format!(
                "world manifest declares a {}x{} map",
                config.map_width, config.map_height
            )
            .into());
        }
        Ok(config)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.map_width as f32, self.map_height as f32)
    }
}

#[derive(Debug)]
pub struct DimensionMismatch {
    pub what: &'static str,
    pub expected: (u32, u32),
    pub actual: (u32, u32),
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is {}x{}, expected {}x{}",
            self.what, self.actual.0, self.actual.1, self.expected.0, self.expected.1
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Per-pixel obstruction field for the whole map. A pixel is solid iff the
/// source image is pure black at that coordinate; alpha is ignored.
pub struct TerrainMask {
    width: usize,
    height: usize,
    solid: Vec<bool>,
}

impl TerrainMask {
    pub fn from_image(image: &Image) -> Self {
        let width = image.width as usize;
        let height = image.height as usize;
        let data = image.get_image_data();
        let mut solid = vec![false; width * height];
        for (i, pixel) in data.iter().enumerate() {
            solid[i] = pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0;
        }
        Self {
            width,
            height,
            solid,
        }
    }

    pub fn from_solid(width: usize, height: usize, solid: Vec<bool>) -> Self {
        assert_eq!(solid.len(), width * height);
        Self {
            width,
            height,
            solid,
        }
    }

    pub async fn load(
        path: &str,
        expected_width: u32,
        expected_height: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let image = load_image(&asset_path(path)).await?;
        if image.width as u32 != expected_width || image.height as u32 != expected_height {
            return Err(Box::new(DimensionMismatch {
                what: "collision mask",
                expected: (expected_width, expected_height),
                actual: (image.width as u32, image.height as u32),
            }));
        }
        Ok(Self::from_image(&image))
    }

    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.solid[y * self.width + x]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Coarse spatial index over a `TerrainMask`: one flag per 32x32 chunk,
/// set when any covered pixel is solid. Built once at startup, read-only
/// afterwards.
pub struct ChunkGrid {
    chunk_size: usize,
    cols: usize,
    rows: usize,
    blocked: Vec<bool>,
}

impl ChunkGrid {
    pub fn build(mask: &TerrainMask, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let cols = (mask.width() + chunk_size - 1) / chunk_size;
        let rows = (mask.height() + chunk_size - 1) / chunk_size;
        let mut blocked = vec![false; cols * rows];

        for cy in 0..rows {
            for cx in 0..cols {
                let x0 = cx * chunk_size;
                let y0 = cy * chunk_size;
                let x1 = (x0 + chunk_size).min(mask.width());
                let y1 = (y0 + chunk_size).min(mask.height());
                'chunk: for y in y0..y1 {
                    for x in x0..x1 {
                        if mask.is_solid(x, y) {
                            blocked[cy * cols + cx] = true;
                            break 'chunk;
                        }
                    }
                }
            }
        }

        Self {
            chunk_size,
            cols,
            rows,
            blocked,
        }
    }

    pub fn is_blocked(&self, cx: usize, cy: usize) -> bool {
        if cx >= self.cols || cy >= self.rows {
            return false;
        }
        self.blocked[cy * self.cols + cx]
    }

    pub fn chunk_bounds(&self, cx: usize, cy: usize) -> Rect {
        let size = self.chunk_size as f32;
        Rect::new(cx as f32 * size, cy as f32 * size, size, size)
    }

    /// Fills `out` with the rectangles of blocked chunks that overlap
    /// `region`. A region outside the grid yields no candidates.
    pub fn fill_blocked_in(&self, region: Rect, out: &mut Vec<Rect>) {
        out.clear();
        if region.w <= 0.0 || region.h <= 0.0 {
            return;
        }
        let size = self.chunk_size as f32;
        let start_x = (region.x / size).floor().max(0.0) as usize;
        let start_y = (region.y / size).floor().max(0.0) as usize;
        if (region.x + region.w) <= 0.0 || (region.y + region.h) <= 0.0 {
            return;
        }
        let end_x = (((region.x + region.w) / size).ceil() as usize).min(self.cols);
        let end_y = (((region.y + region.h) / size).ceil() as usize).min(self.rows);

        for cy in start_y..end_y {
            for cx in start_x..end_x {
                if !self.is_blocked(cx, cy) {
                    continue;
                }
                let chunk = self.chunk_bounds(cx, cy);
                if rects_overlap(chunk, region) {
                    out.push(chunk);
                }
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}
