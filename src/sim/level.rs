//! Level descriptors
//!
//! A level is a list of map rows (one character per tile) plus the dynamic
//! objects placed on top. Descriptors are plain serde data so the runner can
//! load alternatives from JSON.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Axis;

/// Pixel position in level space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl SpawnPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn pos(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Moving platform placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub direction: Axis,
    /// Peak displacement from the start position
    pub distance: f32,
    /// Phase advance, radians per second
    pub speed: f32,
}

/// Collectible placed in a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Coin,
    Gem,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub x: f32,
    pub y: f32,
    pub item_type: ItemType,
}

/// Everything needed to build a platformer world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub map: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub enemies: Vec<SpawnPoint>,
    #[serde(default)]
    pub collectibles: Vec<ItemSpec>,
    /// Reaching this x wins the level
    pub goal_x: f32,
    #[serde(default = "default_goal_y")]
    pub goal_y: f32,
    #[serde(default = "default_start")]
    pub start: SpawnPoint,
}

fn default_goal_y() -> f32 {
    400.0
}

fn default_start() -> SpawnPoint {
    SpawnPoint::new(100.0, 600.0)
}

/// Errors reading a level file
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Empty,
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "could not read level: {e}"),
            LevelError::Parse(e) => write!(f, "malformed level: {e}"),
            LevelError::Empty => write!(f, "level map has no rows"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            LevelError::Parse(e) => Some(e),
            LevelError::Empty => None,
        }
    }
}

impl LevelDescriptor {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json).map_err(LevelError::Parse)?;
        if level.map.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(level)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(LevelError::Io)?;
        let level = Self::from_json(&json)?;
        log::info!("Loaded level {} ({} rows)", path.display(), level.map.len());
        Ok(level)
    }

    /// Built-in level: one broken ground row, two moving platforms, two walkers
    pub fn escape_rush() -> Self {
        let mut map = vec![String::new(); 19];
        map.push(
            "########  #  ##  ###  ####  ###  ##  ###  ####  #####  ####  ###  ####  #####  ######  #####  ####  ###  ##  #  ########"
                .to_string(),
        );

        let item = |x: f32, y: f32, item_type| ItemSpec { x, y, item_type };
        Self {
            map,
            platforms: vec![
                PlatformSpec {
                    x: 1300.0,
                    y: 650.0,
                    width: 80.0,
                    direction: Axis::Horizontal,
                    distance: 40.0,
                    speed: 1.0,
                },
                PlatformSpec {
                    x: 1600.0,
                    y: 600.0,
                    width: 80.0,
                    direction: Axis::Vertical,
                    distance: 30.0,
                    speed: 1.2,
                },
            ],
            enemies: vec![SpawnPoint::new(700.0, 740.0), SpawnPoint::new(1300.0, 740.0)],
            collectibles: vec![
                item(250.0, 740.0, ItemType::Coin),
                item(400.0, 740.0, ItemType::Coin),
                item(550.0, 700.0, ItemType::Coin),
                item(650.0, 680.0, ItemType::Gem),
                item(800.0, 740.0, ItemType::Coin),
                item(900.0, 700.0, ItemType::Coin),
                item(1050.0, 740.0, ItemType::Coin),
                item(1200.0, 680.0, ItemType::Gem),
                item(1350.0, 740.0, ItemType::Coin),
                item(1500.0, 700.0, ItemType::Coin),
                item(1650.0, 740.0, ItemType::Coin),
                item(1800.0, 680.0, ItemType::Gem),
            ],
            goal_x: 2000.0,
            goal_y: 720.0,
            start: default_start(),
        }
    }
}

impl Default for LevelDescriptor {
    fn default() -> Self {
        Self::escape_rush()
    }
}
