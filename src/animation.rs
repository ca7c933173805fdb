use macroquad::file::load_string;
use macroquad::prelude::*;
use serde::Deserialize;

use crate::helpers::asset_path;

pub const FRAME_PERIOD: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Walk,
    Attack,
}

impl Activity {
    pub const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Walk => 1,
            Self::Attack => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Attack => "attack",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub const COUNT: usize = 4;
    pub const ALL: [Facing; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug)]
pub enum AtlasError {
    File(macroquad::Error),
    Yaml(serde_yaml::Error),
    EmptySequence { activity: &'static str, facing: &'static str },
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(err) => write!(f, "file error: {err:?}"),
            Self::Yaml(err) => write!(f, "yaml error: {err}"),
            Self::EmptySequence { activity, facing } => {
                write!(f, "atlas has no frames for {activity}/{facing}")
            }
        }
    }
}

impl std::error::Error for AtlasError {}

impl From<macroquad::Error> for AtlasError {
    fn from(err: macroquad::Error) -> Self {
        Self::File(err)
    }
}

impl From<serde_yaml::Error> for AtlasError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

#[derive(Deserialize)]
struct AtlasFile {
    frame_width: f32,
    frame_height: f32,
    idle: DirectionFrames,
    walk: DirectionFrames,
    attack: DirectionFrames,
}

#[derive(Deserialize)]
struct DirectionFrames {
    up: Vec<[f32; 2]>,
    down: Vec<[f32; 2]>,
    left: Vec<[f32; 2]>,
    right: Vec<[f32; 2]>,
}

impl DirectionFrames {
    fn get(&self, facing: Facing) -> &[[f32; 2]] {
        match facing {
            Facing::Up => &self.up,
            Facing::Down => &self.down,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
        }
    }
}

/// Fixed table of frame source rectangles, indexed by (activity, facing).
/// Every one of the 12 sequences is non-empty; the loader rejects atlases
/// that violate this.
pub struct FrameTable {
    sequences: [[Vec<Rect>; Facing::COUNT]; Activity::COUNT],
    frame_size: Vec2,
}

impl FrameTable {
    pub async fn load(path: &str) -> Result<Self, AtlasError> {
        let yaml = load_string(&asset_path(path)).await?;
        let parsed: AtlasFile = serde_yaml::from_str(&yaml)?;
        Self::from_atlas(parsed)
    }

    fn from_atlas(atlas: AtlasFile) -> Result<Self, AtlasError> {
        let frame_size = vec2(atlas.frame_width, atlas.frame_height);
        let mut sequences: [[Vec<Rect>; Facing::COUNT]; Activity::COUNT] = Default::default();

        for activity in [Activity::Idle, Activity::Walk, Activity::Attack] {
            let frames = match activity {
                Activity::Idle => &atlas.idle,
                Activity::Walk => &atlas.walk,
                Activity::Attack => &atlas.attack,
            };
            for facing in Facing::ALL {
                let offsets = frames.get(facing);
                if offsets.is_empty() {
                    return Err(AtlasError::EmptySequence {
                        activity: activity.name(),
                        facing: facing.name(),
                    });
                }
                sequences[activity.index()][facing.index()] = offsets
                    .iter()
                    .map(|&[x, y]| Rect::new(x, y, frame_size.x, frame_size.y))
                    .collect();
            }
        }

        Ok(Self {
            sequences,
            frame_size,
        })
    }

    pub fn from_sequences(
        sequences: [[Vec<Rect>; Facing::COUNT]; Activity::COUNT],
        frame_size: Vec2,
    ) -> Self {
        Self {
            sequences,
            frame_size,
        }
    }

    pub fn sequence(&self, activity: Activity, facing: Facing) -> &[Rect] {
        &self.sequences[activity.index()][facing.index()]
    }

    pub fn frame_size(&self) -> Vec2 {
        self.frame_size
    }
}

/// Drives the idle/walk/attack animation cycle. Transitions are evaluated
/// once per frame after movement resolution; the frame index advances every
/// `FRAME_PERIOD` seconds of accumulated time.
pub struct Animator {
    activity: Activity,
    facing: Facing,
    frame: usize,
    timer: f32,
    attacking: bool,
}

impl Animator {
    pub fn new(facing: Facing) -> Self {
        Self {
            activity: Activity::Idle,
            facing,
            frame: 0,
            timer: 0.0,
            attacking: false,
        }
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// Picks the activity for this frame. An attack in progress is sticky and
    /// cannot be re-triggered until it finishes.
    pub fn apply_transitions(&mut self, attack_pressed: bool, moved: bool) {
        if self.attacking {
            return;
        }
        if attack_pressed {
            self.activity = Activity::Attack;
            self.attacking = true;
            self.frame = 0;
        } else if moved {
            self.activity = Activity::Walk;
        } else {
            self.activity = Activity::Idle;
        }
    }

    pub fn advance(&mut self, dt: f32, table: &FrameTable) {
        self.timer += dt;
        if self.timer < FRAME_PERIOD {
            return;
        }
        self.timer = 0.0;

        let len = table.sequence(self.activity, self.facing).len();
        if self.attacking {
            // Attack sequences do not wrap: the last frame stays current for
            // a full period, then the attack ends at the next tick.
            if self.frame + 1 >= len {
                self.attacking = false;
                self.activity = Activity::Idle;
                self.frame = 0;
            } else {
                self.frame += 1;
            }
        } else {
            self.frame = (self.frame + 1) % len.max(1);
        }
    }

    pub fn current_frame(&self, table: &FrameTable) -> Rect {
        let frames = table.sequence(self.activity, self.facing);
        frames[self.frame % frames.len()]
    }
}
