use macroquad::prelude::*;

use crate::animation::{Animator, Facing, FrameTable};
use crate::camera::Camera;
use crate::helpers::{clamp_rect_to_bounds, expand_rect};
use crate::world::ChunkGrid;

pub const PLAYER_SPEED: f32 = 4.0;
const PROBE_MARGIN: f32 = 32.0;

/// Key states sampled once at the top of the frame. Owned by the input
/// collaborator; the movement core never polls the keyboard itself.
#[derive(Clone, Copy, Default)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub attack: bool,
}

impl FrameInput {
    pub fn poll() -> Self {
        Self {
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            attack: is_key_down(KeyCode::Space),
        }
    }
}

/// Solid sample points of the actor silhouette, in local coordinates
/// relative to the bounding box origin. Built once from the silhouette
/// image (exact-black pixels) and immutable afterwards.
pub struct CollisionShape {
    points: Vec<Vec2>,
}

impl CollisionShape {
    pub fn from_image(image: &Image) -> Self {
        let data = image.get_image_data();
        let width = image.width as usize;
        let mut points = Vec::new();
        for (i, pixel) in data.iter().enumerate() {
            if pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0 {
                points.push(vec2((i % width) as f32, (i / width) as f32));
            }
        }
        Self { points }
    }

    pub fn from_points(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if any sample point, offset by `origin`, falls inside one of the
    /// candidate chunk rectangles. The whole chunk counts as solid; this is
    /// deliberately coarser than the per-pixel mask.
    pub fn overlaps(&self, origin: Vec2, candidates: &[Rect]) -> bool {
        for point in &self.points {
            let world = origin + *point;
            for rect in candidates {
                if world.x >= rect.x
                    && world.x < rect.x + rect.w
                    && world.y >= rect.y
                    && world.y < rect.y + rect.h
                {
                    return true;
                }
            }
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Applies `delta` on one axis, then rolls it back if the moved shape
/// overlaps a blocked chunk near the new bounding box. Returns true when the
/// move committed.
pub fn step_axis(
    pos: &mut Vec2,
    size: Vec2,
    axis: Axis,
    delta: f32,
    shape: &CollisionShape,
    grid: &ChunkGrid,
    scratch: &mut Vec<Rect>,
) -> bool {
    let prev = match axis {
        Axis::X => pos.x,
        Axis::Y => pos.y,
    };
    match axis {
        Axis::X => pos.x = prev + delta,
        Axis::Y => pos.y = prev + delta,
    }

    let probe = expand_rect(Rect::new(pos.x, pos.y, size.x, size.y), PROBE_MARGIN);
    grid.fill_blocked_in(probe, scratch);

    if shape.overlaps(*pos, scratch) {
        match axis {
            Axis::X => pos.x = prev,
            Axis::Y => pos.y = prev,
        }
        false
    } else {
        true
    }
}

pub struct MoveOutcome {
    /// Direction of the last movement key processed this frame, updated even
    /// when that key's move was rolled back. None while attacking or with no
    /// movement key held.
    pub facing: Option<Facing>,
    pub moved: bool,
}

/// Resolves one frame of movement: each held direction key is applied and
/// collision-tested in left/right/up/down order (horizontal before vertical,
/// so a diagonal push can slide along whichever axis is open), then the
/// bounding box is clamped into `bounds`. While attacking no positional
/// update is attempted at all.
pub fn resolve_movement(
    pos: &mut Vec2,
    size: Vec2,
    input: &FrameInput,
    attacking: bool,
    shape: &CollisionShape,
    grid: &ChunkGrid,
    bounds: Rect,
    scratch: &mut Vec<Rect>,
) -> MoveOutcome {
    let prev = *pos;
    let mut facing = None;

    if !attacking {
        if input.left {
            facing = Some(Facing::Left);
            step_axis(pos, size, Axis::X, -PLAYER_SPEED, shape, grid, scratch);
        }
        if input.right {
            facing = Some(Facing::Right);
            step_axis(pos, size, Axis::X, PLAYER_SPEED, shape, grid, scratch);
        }
        if input.up {
            facing = Some(Facing::Up);
            step_axis(pos, size, Axis::Y, -PLAYER_SPEED, shape, grid, scratch);
        }
        if input.down {
            facing = Some(Facing::Down);
            step_axis(pos, size, Axis::Y, PLAYER_SPEED, shape, grid, scratch);
        }

        // The clamp always wins over collision state.
        *pos = clamp_rect_to_bounds(*pos, size, bounds);
    }

    MoveOutcome {
        facing,
        moved: *pos != prev,
    }
}

pub struct Player {
    pos: Vec2,
    size: Vec2,
    shape: CollisionShape,
    animator: Animator,
    frames: FrameTable,
    sheet: Texture2D,
    scratch: Vec<Rect>,
}

impl Player {
    pub fn new(pos: Vec2, sheet: Texture2D, frames: FrameTable, shape: CollisionShape) -> Self {
        let size = frames.frame_size();
        Self {
            pos,
            size,
            shape,
            animator: Animator::new(Facing::Down),
            frames,
            sheet,
            scratch: Vec::with_capacity(16),
        }
    }

    /// One frame of simulation: resolve movement, then feed the outcome to
    /// the animation state machine.
    pub fn update(&mut self, input: &FrameInput, dt: f32, grid: &ChunkGrid, bounds: Rect) {
        let outcome = resolve_movement(
            &mut self.pos,
            self.size,
            input,
            self.animator.is_attacking(),
            &self.shape,
            grid,
            bounds,
            &mut self.scratch,
        );

        if let Some(facing) = outcome.facing {
            self.animator.set_facing(facing);
        }
        self.animator.apply_transitions(input.attack, outcome.moved);
        self.animator.advance(dt, &self.frames);
    }

    pub fn draw(&self, camera: &Camera) {
        let frame = self.animator.current_frame(&self.frames);
        let screen = camera.apply(self.pos);
        draw_texture_ex(
            &self.sheet,
            screen.x,
            screen.y,
            WHITE,
            DrawTextureParams {
                source: Some(frame),
                dest_size: Some(self.size),
                ..Default::default()
            },
        );
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn world_rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TerrainMask;

    fn grid_with_pixels(width: usize, height: usize, pixels: &[(usize, usize)]) -> ChunkGrid {
        let mut solid = vec![false; width * height];
        for &(x, y) in pixels {
            solid[y * width + x] = true;
        }
        ChunkGrid::build(&TerrainMask::from_solid(width, height, solid), 32)
    }

    fn point_shape() -> CollisionShape {
        CollisionShape::from_points(vec![vec2(0.0, 0.0)])
    }

    #[test]
    fn open_move_commits_by_exactly_speed() {
        let grid = grid_with_pixels(256, 256, &[]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let mut pos = vec2(68.0, 68.0);

        let committed = step_axis(
            &mut pos,
            vec2(1.0, 1.0),
            Axis::X,
            PLAYER_SPEED,
            &shape,
            &grid,
            &mut scratch,
        );
        assert!(committed);
        assert_eq!(pos, vec2(72.0, 68.0));
    }

    #[test]
    fn blocked_move_rolls_back_to_previous_coordinate() {
        // Solid pixel at (100,100) blocks the chunk spanning 96..128 on
        // both axes.
        let grid = grid_with_pixels(256, 256, &[(100, 100)]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let mut pos = vec2(94.0, 100.0);

        let committed = step_axis(
            &mut pos,
            vec2(1.0, 1.0),
            Axis::X,
            PLAYER_SPEED,
            &shape,
            &grid,
            &mut scratch,
        );
        assert!(!committed);
        assert_eq!(pos, vec2(94.0, 100.0));
    }

    #[test]
    fn diagonal_move_slides_along_the_open_axis() {
        let grid = grid_with_pixels(256, 256, &[(100, 100)]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        // X destination lands inside the blocked chunk; after the rollback
        // the Y destination stays left of it.
        let mut pos = vec2(94.0, 100.0);

        let x_committed = step_axis(
            &mut pos,
            vec2(1.0, 1.0),
            Axis::X,
            PLAYER_SPEED,
            &shape,
            &grid,
            &mut scratch,
        );
        let y_committed = step_axis(
            &mut pos,
            vec2(1.0, 1.0),
            Axis::Y,
            PLAYER_SPEED,
            &shape,
            &grid,
            &mut scratch,
        );

        assert!(!x_committed);
        assert!(y_committed);
        assert_eq!(pos, vec2(94.0, 104.0));
    }

    #[test]
    fn facing_updates_even_when_the_move_is_blocked() {
        let grid = grid_with_pixels(256, 256, &[(100, 100)]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let bounds = Rect::new(0.0, 0.0, 256.0, 256.0);
        let mut pos = vec2(94.0, 100.0);
        let input = FrameInput {
            right: true,
            ..Default::default()
        };

        let outcome = resolve_movement(
            &mut pos,
            vec2(1.0, 1.0),
            &input,
            false,
            &shape,
            &grid,
            bounds,
            &mut scratch,
        );

        assert_eq!(outcome.facing, Some(Facing::Right));
        assert!(!outcome.moved);
        assert_eq!(pos, vec2(94.0, 100.0));
    }

    #[test]
    fn attacking_suppresses_all_positional_updates() {
        let grid = grid_with_pixels(256, 256, &[]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let bounds = Rect::new(0.0, 0.0, 256.0, 256.0);
        let mut pos = vec2(68.0, 68.0);
        let input = FrameInput {
            right: true,
            down: true,
            attack: true,
            ..Default::default()
        };

        let outcome = resolve_movement(
            &mut pos,
            vec2(1.0, 1.0),
            &input,
            true,
            &shape,
            &grid,
            bounds,
            &mut scratch,
        );

        assert_eq!(outcome.facing, None);
        assert!(!outcome.moved);
        assert_eq!(pos, vec2(68.0, 68.0));
    }

    #[test]
    fn last_processed_movement_key_wins_facing() {
        let grid = grid_with_pixels(256, 256, &[]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let bounds = Rect::new(0.0, 0.0, 256.0, 256.0);
        let mut pos = vec2(100.0, 100.0);
        // Opposite keys cancel out positionally; facing follows the key
        // processed last.
        let input = FrameInput {
            left: true,
            right: true,
            ..Default::default()
        };

        let outcome = resolve_movement(
            &mut pos,
            vec2(1.0, 1.0),
            &input,
            false,
            &shape,
            &grid,
            bounds,
            &mut scratch,
        );

        assert_eq!(outcome.facing, Some(Facing::Right));
        assert!(!outcome.moved);
        assert_eq!(pos, vec2(100.0, 100.0));
    }

    #[test]
    fn world_clamp_applies_after_axis_resolution() {
        let grid = grid_with_pixels(256, 256, &[]);
        let shape = point_shape();
        let mut scratch = Vec::new();
        let bounds = Rect::new(0.0, 0.0, 256.0, 256.0);
        let mut pos = vec2(2.0, 50.0);
        let input = FrameInput {
            left: true,
            ..Default::default()
        };

        let outcome = resolve_movement(
            &mut pos,
            vec2(1.0, 1.0),
            &input,
            false,
            &shape,
            &grid,
            bounds,
            &mut scratch,
        );

        assert!(outcome.moved);
        assert_eq!(pos, vec2(0.0, 50.0));
    }

    #[test]
    fn single_point_shape_against_one_chunk_rectangle() {
        // One blocked chunk at (100,100)-(132,132), actor sample point at
        // local (0,0).
        let shape = point_shape();
        let chunk = [Rect::new(100.0, 100.0, 32.0, 32.0)];

        assert!(!shape.overlaps(vec2(72.0, 68.0), &chunk));
        assert!(shape.overlaps(vec2(102.0, 100.0), &chunk));
        // Right/bottom edges are exclusive.
        assert!(!shape.overlaps(vec2(132.0, 100.0), &chunk));
        assert!(shape.overlaps(vec2(100.0, 131.0), &chunk));
    }

    #[test]
    fn shape_points_come_from_black_pixels_only() {
        let mut image = Image::gen_image_color(3, 3, WHITE);
        image.set_pixel(1, 1, BLACK);
        image.set_pixel(2, 0, BLACK);
        let shape = CollisionShape::from_image(&image);

        assert_eq!(shape.len(), 2);
        assert!(shape.overlaps(vec2(0.0, 0.0), &[Rect::new(1.0, 1.0, 0.5, 0.5)]));
    }

    #[test]
    fn clamp_keeps_bounding_box_inside_world() {
        let bounds = Rect::new(0.0, 0.0, 3955.0, 2875.0);
        let size = vec2(90.0, 110.0);

        let clamped = clamp_rect_to_bounds(vec2(-12.0, 2900.0), size, bounds);
        assert_eq!(clamped, vec2(0.0, 2875.0 - 110.0));

        let clamped = clamp_rect_to_bounds(vec2(4000.0, -5.0), size, bounds);
        assert_eq!(clamped, vec2(3955.0 - 90.0, 0.0));
    }
}
