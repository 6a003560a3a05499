//! Collision detection and response for boxes against the world
//!
//! Axis-separated resolution: move along x, push out of every solid tile the
//! body now overlaps, then do the same along y. The push direction comes from
//! the sign of the displacement on that axis. A body that overlaps with zero
//! displacement is pushed out the shallow side instead.
//!
//! Known limitation: a displacement larger than a tile in one frame can skip
//! through it. Frame dt is capped, which keeps this out of reach at the speeds
//! the games use.

use glam::Vec2;

use super::aabb::{Aabb, Axis};
use super::entity::Body;
use super::world::World;

/// Which way a body was pushed to clear an overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// Toward -x / up
    Negative,
    /// Toward +x / down
    Positive,
}

/// What a body touched while moving one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contact {
    /// Resting on a tile top or platform
    pub grounded: bool,
    /// Stopped by a tile on the x axis
    pub hit_wall: bool,
    /// Stopped by a tile underside
    pub hit_ceiling: bool,
}

/// Displace `body` by `delta` along `axis`, then push it out of each
/// overlapping obstacle in order. Returns the last push applied, if any.
pub fn resolve_axis(body: &mut Body, axis: Axis, delta: f32, obstacles: &[Aabb]) -> Option<Push> {
    match axis {
        Axis::Horizontal => body.pos.x += delta,
        Axis::Vertical => body.pos.y += delta,
    }

    let mut pushed = None;
    for obstacle in obstacles {
        let current = body.aabb();
        if !current.intersects(obstacle) {
            continue;
        }

        let (lo, hi) = obstacle.span(axis);
        let (body_lo, body_hi) = current.span(axis);
        let push = if delta > 0.0 {
            Push::Negative
        } else if delta < 0.0 {
            Push::Positive
        } else if body_hi - lo <= hi - body_lo {
            Push::Negative
        } else {
            Push::Positive
        };

        let extent = axis.of(body.size);
        let target = match push {
            Push::Negative => lo - extent,
            Push::Positive => hi,
        };
        match axis {
            Axis::Horizontal => body.pos.x = target,
            Axis::Vertical => body.pos.y = target,
        }
        pushed = Some(push);
    }
    pushed
}

/// Integrate one frame of `body.vel` against the world's solid tiles.
///
/// Velocity on a blocked axis is zeroed. Moving platforms are not
/// considered; see [`land_on_platforms`].
pub fn move_and_collide(body: &mut Body, world: &World, dt: f32) -> Contact {
    let mut contact = Contact::default();

    let dx = body.vel.x * dt;
    if sweep(body, world, Axis::Horizontal, dx).is_some() {
        body.vel.x = 0.0;
        contact.hit_wall = true;
    }

    let dy = body.vel.y * dt;
    match sweep(body, world, Axis::Vertical, dy) {
        Some(Push::Negative) => {
            body.vel.y = 0.0;
            contact.grounded = true;
        }
        Some(Push::Positive) => {
            body.vel.y = 0.0;
            contact.hit_ceiling = true;
        }
        None => {}
    }

    contact
}

fn sweep(body: &mut Body, world: &World, axis: Axis, delta: f32) -> Option<Push> {
    let before = body.aabb();
    let area = before.union(&before.translated(axis.unit() * delta));
    let solids: Vec<Aabb> = world.solids_in(area).collect();
    resolve_axis(body, axis, delta, &solids)
}

/// Snap a falling body onto any platform whose top it has just reached.
///
/// Only lands while `vel.y >= 0` and the body's bottom is within
/// `tolerance` of the platform top. Returns true if it landed.
pub fn land_on_platforms(body: &mut Body, world: &World, tolerance: f32) -> bool {
    let mut landed = false;
    for platform in world.platform_boxes() {
        let current = body.aabb();
        if current.intersects(&platform)
            && body.vel.y >= 0.0
            && current.bottom() <= platform.top() + tolerance
        {
            body.pos.y = platform.top() - body.size.y;
            body.vel.y = 0.0;
            landed = true;
        }
    }
    landed
}

/// Whether there is solid ground just past the body's leading edge.
///
/// Probes `probe` units beyond the edge in the direction of travel and
/// `probe` units below the feet.
pub fn ground_ahead(body: &Body, world: &World, probe: f32) -> bool {
    let x = if body.vel.x > 0.0 {
        body.pos.x + body.size.x + probe
    } else {
        body.pos.x - probe
    };
    world.is_solid_at(Vec2::new(x, body.bottom() + probe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::TileGrid;
    use proptest::prelude::*;

    fn world_from(rows: &[&str]) -> World {
        let grid = TileGrid::from_rows(rows, 40.0);
        World {
            bounds: Aabb::from_pos_size(Vec2::ZERO, grid.extent()),
            grid,
            platforms: Vec::new(),
        }
    }

    fn ground_world() -> World {
        world_from(&["        ", "        ", "        ", "########"])
    }

    #[test]
    fn test_resting_body_stays_grounded() {
        let world = ground_world();
        let mut body = Body::new(Vec2::new(100.0, 88.0), Vec2::new(24.0, 32.0));
        for _ in 0..120 {
            body.apply_gravity(1200.0, 1.0 / 60.0);
            let contact = move_and_collide(&mut body, &world, 1.0 / 60.0);
            assert!(contact.grounded);
            assert_eq!(body.vel.y, 0.0);
            assert_eq!(body.bottom(), 120.0);
        }
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let world = world_from(&["   #", "   #", "   #", "####"]);
        let mut body = Body::new(Vec2::new(80.0, 88.0), Vec2::new(24.0, 32.0))
            .with_velocity(Vec2::new(600.0, 0.0));
        let contact = move_and_collide(&mut body, &world, 0.1);
        assert!(contact.hit_wall);
        assert_eq!(body.pos.x, 120.0 - 24.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_ceiling_bump() {
        let world = world_from(&["####", "    ", "    ", "####"]);
        let mut body = Body::new(Vec2::new(40.0, 50.0), Vec2::new(24.0, 32.0))
            .with_velocity(Vec2::new(0.0, -300.0));
        let contact = move_and_collide(&mut body, &world, 0.1);
        assert!(contact.hit_ceiling);
        assert!(!contact.grounded);
        assert_eq!(body.pos.y, 40.0);
    }

    #[test]
    fn test_zero_displacement_uses_shallow_side() {
        let obstacle = Aabb::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(40.0, 40.0));
        let mut body = Body::new(Vec2::new(30.0, 10.0), Vec2::new(20.0, 20.0));
        let push = resolve_axis(&mut body, Axis::Horizontal, 0.0, &[obstacle]);
        assert_eq!(push, Some(Push::Positive));
        assert_eq!(body.pos.x, 40.0);
    }

    #[test]
    fn test_platform_landing_requires_descent() {
        let mut world = ground_world();
        world.platforms.push(crate::sim::world::MovingPlatform::new(
            Vec2::new(0.0, 60.0),
            80.0,
            Axis::Horizontal,
            0.0,
            0.0,
        ));

        let mut falling = Body::new(Vec2::new(10.0, 30.0), Vec2::new(24.0, 32.0))
            .with_velocity(Vec2::new(0.0, 50.0));
        assert!(land_on_platforms(&mut falling, &world, 15.0));
        assert_eq!(falling.bottom(), 60.0);

        let mut rising = Body::new(Vec2::new(10.0, 30.0), Vec2::new(24.0, 32.0))
            .with_velocity(Vec2::new(0.0, -50.0));
        assert!(!land_on_platforms(&mut rising, &world, 15.0));

        // Too deep below the top: passes through
        let mut deep = Body::new(Vec2::new(10.0, 44.0), Vec2::new(24.0, 32.0))
            .with_velocity(Vec2::new(0.0, 50.0));
        assert!(!land_on_platforms(&mut deep, &world, 15.0));
    }

    #[test]
    fn test_ground_ahead_probe() {
        let world = world_from(&["    ", "    ", "    ", "##  "]);
        let mut walker = Body::new(Vec2::new(40.0, 100.0), Vec2::new(20.0, 20.0))
            .with_velocity(Vec2::new(60.0, 0.0));
        // Leading edge at 60: the probe at x 65 still lands on column 1
        assert!(ground_ahead(&walker, &world, 5.0));
        walker.pos.x = 60.0;
        assert!(!ground_ahead(&walker, &world, 5.0));
        walker.vel.x = -60.0;
        assert!(ground_ahead(&walker, &world, 5.0));
    }

    fn quarter(range: std::ops::Range<i32>) -> impl Strategy<Value = f32> {
        range.prop_map(|q| q as f32 * 0.25)
    }

    proptest! {
        #[test]
        fn resolved_body_never_overlaps_single_obstacle(
            ox in quarter(-400..400),
            oy in quarter(-400..400),
            ow in quarter(4..400),
            oh in quarter(4..400),
            bx in quarter(-800..800),
            by in quarter(-800..800),
            bw in quarter(4..200),
            bh in quarter(4..200),
            dx in quarter(-400..400),
            dy in quarter(-400..400),
        ) {
            let obstacle = Aabb::from_pos_size(Vec2::new(ox, oy), Vec2::new(ow, oh));
            let mut body = Body::new(Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assume!(!body.aabb().intersects(&obstacle));

            resolve_axis(&mut body, Axis::Horizontal, dx, &[obstacle]);
            prop_assert!(!body.aabb().intersects(&obstacle));
            resolve_axis(&mut body, Axis::Vertical, dy, &[obstacle]);
            prop_assert!(!body.aabb().intersects(&obstacle));
        }

        #[test]
        fn grounded_means_resting_on_a_tile_top(
            x in 0.0f32..280.0,
            vx in -300.0f32..300.0,
            frames in 1usize..90,
        ) {
            let world = world_from(&["        ", "        ", "  #     ", "### ####"]);
            let mut body = Body::new(Vec2::new(x, 0.0), Vec2::new(24.0, 32.0))
                .with_velocity(Vec2::new(vx, 0.0));
            let dt = 1.0 / 60.0;
            for _ in 0..frames {
                body.apply_gravity(1200.0, dt);
                let contact = move_and_collide(&mut body, &world, dt);
                if contact.grounded {
                    prop_assert_eq!(body.vel.y, 0.0);
                    let bottom = body.bottom();
                    prop_assert!(bottom == 80.0 || bottom == 120.0 || bottom == 160.0);
                }
            }
        }
    }
}
