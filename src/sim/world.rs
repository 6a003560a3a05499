//! Spatial world: static tile grid plus moving platforms
//!
//! Tiles never move once a level is loaded; only platforms animate. Entities
//! query the world read-only; the world never refers back to them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Axis};
use super::level::{LevelDescriptor, PlatformSpec};
use crate::render::{Color, Shape, Surface, palette};

/// Height of every moving platform
pub const PLATFORM_HEIGHT: f32 = 16.0;

/// Cell type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Grass,
    Stone,
    Wood,
    Water,
    Lava,
}

impl TileKind {
    /// Map a level-map character to a tile
    pub fn from_char(c: char) -> Self {
        match c {
            '#' => TileKind::Grass,
            'S' => TileKind::Stone,
            'W' => TileKind::Wood,
            '~' => TileKind::Water,
            'L' => TileKind::Lava,
            _ => TileKind::Empty,
        }
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone | TileKind::Wood)
    }

    #[inline]
    pub fn is_hazard(self) -> bool {
        matches!(self, TileKind::Water | TileKind::Lava)
    }

    fn color(self) -> Color {
        match self {
            TileKind::Empty => palette::BLACK,
            TileKind::Grass => palette::DARK_GREEN,
            TileKind::Stone => palette::GRAY,
            TileKind::Wood => palette::BROWN,
            TileKind::Water => palette::BLUE,
            TileKind::Lava => palette::RED,
        }
    }
}

/// Fixed grid of cells, row-major, anchored at the world origin
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    cell: f32,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// All-empty grid
    pub fn empty(cols: usize, rows: usize, cell: f32) -> Self {
        Self {
            cols,
            rows,
            cell,
            cells: vec![TileKind::Empty; cols * rows],
        }
    }

    /// Grid from map rows; short rows are padded with empty cells
    pub fn from_rows<S: AsRef<str>>(rows: &[S], cell: f32) -> Self {
        let cols = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        let mut grid = Self::empty(cols, rows.len(), cell);
        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.as_ref().chars().enumerate() {
                grid.cells[row * cols + col] = TileKind::from_char(c);
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Pixel extent of the grid
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * self.cell, self.rows as f32 * self.cell)
    }

    pub fn get(&self, col: usize, row: usize) -> TileKind {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col]
        } else {
            TileKind::Empty
        }
    }

    pub fn cell_box(&self, col: usize, row: usize) -> Aabb {
        Aabb::from_pos_size(
            Vec2::new(col as f32 * self.cell, row as f32 * self.cell),
            Vec2::splat(self.cell),
        )
    }

    /// Cell containing a point, if it is on the grid
    pub fn cell_at(&self, p: Vec2) -> Option<(usize, usize)> {
        if self.cell <= 0.0 || !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        let col = (p.x / self.cell) as usize;
        let row = (p.y / self.cell) as usize;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    pub fn kind_at(&self, p: Vec2) -> TileKind {
        self.cell_at(p)
            .map(|(col, row)| self.get(col, row))
            .unwrap_or(TileKind::Empty)
    }

    /// Non-empty tiles whose cells intersect `area`, in row-major order
    pub fn tiles_in(&self, area: Aabb) -> impl Iterator<Item = (TileKind, Aabb)> + '_ {
        let (cols, rows) = self.cell_span(area);
        rows.flat_map(move |row| cols.clone().map(move |col| (col, row)))
            .filter_map(move |(col, row)| {
                let kind = self.get(col, row);
                let cell = self.cell_box(col, row);
                (kind != TileKind::Empty && cell.intersects(&area)).then_some((kind, cell))
            })
    }

    /// Every non-empty tile
    pub fn tiles(&self) -> impl Iterator<Item = (TileKind, Aabb)> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| (col, row)))
            .filter_map(move |(col, row)| {
                let kind = self.get(col, row);
                (kind != TileKind::Empty).then(|| (kind, self.cell_box(col, row)))
            })
    }

    fn cell_span(&self, area: Aabb) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        if self.cell <= 0.0 {
            return (0..0, 0..0);
        }
        let span = |min: f32, max: f32, len: usize| {
            let lo = (min / self.cell).floor().max(0.0);
            let hi = (max / self.cell).floor() + 1.0;
            if !(lo < hi) || hi <= 0.0 {
                return 0..0;
            }
            (lo as usize).min(len)..(hi as usize).min(len)
        };
        (
            span(area.min.x, area.max.x, self.cols),
            span(area.min.y, area.max.y, self.rows),
        )
    }
}

/// Platform oscillating sinusoidally along one axis
#[derive(Debug, Clone, PartialEq)]
pub struct MovingPlatform {
    pub start: Vec2,
    pub size: Vec2,
    pub axis: Axis,
    /// Peak displacement from `start`
    pub amplitude: f32,
    /// Radians per second
    pub angular_speed: f32,
    pub phase: f32,
    pub pos: Vec2,
}

impl MovingPlatform {
    pub fn new(start: Vec2, width: f32, axis: Axis, amplitude: f32, angular_speed: f32) -> Self {
        Self {
            start,
            size: Vec2::new(width, PLATFORM_HEIGHT),
            axis,
            amplitude,
            angular_speed,
            phase: 0.0,
            pos: start,
        }
    }

    pub fn from_spec(spec: &PlatformSpec) -> Self {
        Self::new(
            Vec2::new(spec.x, spec.y),
            spec.width,
            spec.direction,
            spec.distance,
            spec.speed,
        )
    }

    pub fn update(&mut self, dt: f32) {
        self.phase += self.angular_speed * dt;
        let offset = self.phase.sin() * self.amplitude;
        self.pos = match self.axis {
            Axis::Horizontal => Vec2::new(self.start.x + offset, self.start.y),
            Axis::Vertical => Vec2::new(self.start.x, self.start.y + offset),
        };
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Static tiles, moving platforms and the play-area bounds
#[derive(Debug, Clone)]
pub struct World {
    pub grid: TileGrid,
    pub platforms: Vec<MovingPlatform>,
    /// Play area; entities leaving it are out of bounds
    pub bounds: Aabb,
}

impl World {
    /// Open field with no geometry, gridded at `cell` for spawn placement
    pub fn open(size: Vec2, cell: f32) -> Self {
        let (cols, rows) = if cell > 0.0 {
            ((size.x / cell) as usize, (size.y / cell) as usize)
        } else {
            (0, 0)
        };
        Self {
            grid: TileGrid::empty(cols, rows, cell),
            platforms: Vec::new(),
            bounds: Aabb::from_pos_size(Vec2::ZERO, size),
        }
    }

    /// Build the world described by a level
    pub fn from_level(level: &LevelDescriptor, tile_size: f32, screen: Vec2) -> Self {
        let grid = TileGrid::from_rows(&level.map, tile_size);
        let extent = grid.extent().max(screen);
        let platforms = level.platforms.iter().map(MovingPlatform::from_spec).collect();
        log::debug!(
            "Level loaded: {}x{} tiles, {} platforms",
            grid.cols(),
            grid.rows(),
            level.platforms.len()
        );
        Self {
            grid,
            platforms,
            bounds: Aabb::from_pos_size(Vec2::ZERO, extent),
        }
    }

    /// Advance platform motion
    pub fn update(&mut self, dt: f32) {
        for platform in &mut self.platforms {
            platform.update(dt);
        }
    }

    /// Solid tile boxes intersecting `area`
    pub fn solids_in(&self, area: Aabb) -> impl Iterator<Item = Aabb> + '_ {
        self.grid
            .tiles_in(area)
            .filter(|(kind, _)| kind.is_solid())
            .map(|(_, cell)| cell)
    }

    pub fn platform_boxes(&self) -> impl Iterator<Item = Aabb> + '_ {
        self.platforms.iter().map(MovingPlatform::aabb)
    }

    /// Whether `area` overlaps any hazard tile
    pub fn touches_hazard(&self, area: Aabb) -> bool {
        self.grid.tiles_in(area).any(|(kind, _)| kind.is_hazard())
    }

    /// Whether a point lies inside a solid tile
    pub fn is_solid_at(&self, p: Vec2) -> bool {
        self.grid.kind_at(p).is_solid()
    }

    /// Draw tiles and platforms shifted by `-camera`
    pub fn draw(&self, surface: &mut dyn Surface, camera: Vec2) {
        for (kind, cell) in self.grid.tiles() {
            surface.draw(Shape::Rect {
                min: cell.min - camera,
                size: cell.size(),
                color: kind.color(),
            });
        }
        for platform in &self.platforms {
            surface.draw(Shape::Rect {
                min: platform.pos - camera,
                size: platform.size,
                color: palette::GRAY,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TileGrid {
        TileGrid::from_rows(&["    ", " ~L ", "#SW#"], 40.0)
    }

    #[test]
    fn solidity_is_a_function_of_kind() {
        assert!(TileKind::Grass.is_solid());
        assert!(TileKind::Stone.is_solid());
        assert!(TileKind::Wood.is_solid());
        assert!(!TileKind::Water.is_solid());
        assert!(TileKind::Lava.is_hazard());
        assert!(!TileKind::Empty.is_solid());
        assert_eq!(TileKind::from_char('?'), TileKind::Empty);
    }

    #[test]
    fn grid_parses_rows() {
        let grid = sample();
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.get(1, 1), TileKind::Water);
        assert_eq!(grid.get(3, 2), TileKind::Grass);
        assert_eq!(grid.get(9, 9), TileKind::Empty);
        assert_eq!(grid.tiles().count(), 6);
    }

    #[test]
    fn tiles_in_only_returns_overlaps() {
        let grid = sample();
        // Box sitting exactly on top of the ground row touches but does not overlap
        let resting = Aabb::from_pos_size(Vec2::new(0.0, 48.0), Vec2::new(24.0, 32.0));
        assert_eq!(grid.tiles_in(resting).filter(|(k, _)| k.is_solid()).count(), 0);
        let sunk = resting.translated(Vec2::new(0.0, 1.0));
        assert_eq!(grid.tiles_in(sunk).filter(|(k, _)| k.is_solid()).count(), 1);
    }

    #[test]
    fn tiles_in_handles_off_grid_areas() {
        let grid = sample();
        let far = Aabb::from_pos_size(Vec2::new(-500.0, -500.0), Vec2::new(10.0, 10.0));
        assert_eq!(grid.tiles_in(far).count(), 0);
        let huge = Aabb::from_pos_size(Vec2::new(-500.0, -500.0), Vec2::new(5000.0, 5000.0));
        assert_eq!(grid.tiles_in(huge).count(), 6);
    }

    #[test]
    fn point_queries() {
        let grid = sample();
        assert_eq!(grid.kind_at(Vec2::new(5.0, 85.0)), TileKind::Grass);
        assert_eq!(grid.kind_at(Vec2::new(-5.0, 85.0)), TileKind::Empty);
        assert_eq!(grid.cell_at(Vec2::new(f32::NAN, 1.0)), None);
    }

    #[test]
    fn platform_oscillates_on_its_axis() {
        let mut p = MovingPlatform::new(Vec2::new(100.0, 200.0), 80.0, Axis::Vertical, 30.0, 1.0);
        p.update(std::f32::consts::FRAC_PI_2);
        assert!((p.pos.y - 230.0).abs() < 1e-3);
        assert_eq!(p.pos.x, 100.0);
        assert_eq!(p.aabb().size(), Vec2::new(80.0, PLATFORM_HEIGHT));
    }

    #[test]
    fn open_world_has_no_obstacles() {
        let world = World::open(Vec2::new(200.0, 100.0), 20.0);
        assert_eq!(world.grid.cols(), 10);
        let everywhere = world.bounds.expanded(50.0);
        assert_eq!(world.solids_in(everywhere).count(), 0);
        assert!(!world.touches_hazard(everywhere));
    }
}
