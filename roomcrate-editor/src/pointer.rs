//! Pointer and wheel input
//!
//! Coordinates are client pixels, mapped through the editor viewport. What a
//! press does depends on the interaction mode: select mode picks furniture and
//! then orbits while dragging, draw-walls mode spans a new wall from press to
//! release, and move-walls mode drags the nearest wall corner.

use crate::editor::Editor;
use log::debug;
use roomcrate_core::{FloorPoint, InteractionMode};
use roomcrate_scene::{world_to_floor, Ray};

/// Corners closer than this (layout units) count as the same corner
const CORNER_EPSILON: f64 = 1e-6;

/// An in-progress pointer gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Drag {
    Orbit { last_x: f32, last_y: f32 },
    DrawWall { start: FloorPoint },
    MoveCorner { corner: FloorPoint },
}

impl Editor {
    /// World ray under a client position
    pub fn ray_at(&self, client_x: f32, client_y: f32) -> Ray {
        let (x, y) = self.config.viewport.to_ndc(client_x, client_y);
        self.camera.ray_from_ndc(x, y)
    }

    /// Ground-plane point under a client position, in layout units
    pub fn floor_point_at(&self, client_x: f32, client_y: f32) -> Option<FloorPoint> {
        self.ray_at(client_x, client_y)
            .intersect_ground(0.0)
            .map(|p| world_to_floor(&p, self.config.scene.world_scale))
    }

    /// The wall endpoint nearest to `point`, if within the snap distance
    pub fn nearest_corner(&self, point: &FloorPoint) -> Option<FloorPoint> {
        self.walls
            .iter()
            .flat_map(|wall| [wall.start, wall.end])
            .map(|corner| (corner.distance_to(point), corner))
            .filter(|(distance, _)| *distance <= self.config.wall_snap_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, corner)| corner)
    }

    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        self.drag = match self.mode {
            InteractionMode::Select => {
                let hit = self.scene.pick_furniture(&self.ray_at(client_x, client_y));
                debug!("pick at ({}, {}): {:?}", client_x, client_y, hit);
                self.select_item(hit);
                Some(Drag::Orbit {
                    last_x: client_x,
                    last_y: client_y,
                })
            }
            InteractionMode::DrawWalls => self
                .floor_point_at(client_x, client_y)
                .map(|start| Drag::DrawWall { start }),
            InteractionMode::MoveWalls => self
                .floor_point_at(client_x, client_y)
                .and_then(|point| self.nearest_corner(&point))
                .map(|corner| Drag::MoveCorner { corner }),
        };
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        match self.drag {
            Some(Drag::Orbit { last_x, last_y }) => {
                self.camera.orbit(client_x - last_x, client_y - last_y);
                self.drag = Some(Drag::Orbit {
                    last_x: client_x,
                    last_y: client_y,
                });
            }
            Some(Drag::MoveCorner { corner }) => {
                let Some(target) = self.floor_point_at(client_x, client_y) else {
                    return;
                };
                for wall in &mut self.walls {
                    for end in [&mut wall.start, &mut wall.end] {
                        if end.distance_to(&corner) < CORNER_EPSILON {
                            *end = target;
                        }
                    }
                }
                self.drag = Some(Drag::MoveCorner { corner: target });
                self.sync_walls();
            }
            Some(Drag::DrawWall { .. }) | None => {}
        }
    }

    pub fn pointer_up(&mut self, client_x: f32, client_y: f32) {
        if let Some(Drag::DrawWall { start }) = self.drag {
            if let Some(end) = self.floor_point_at(client_x, client_y) {
                if self.add_wall(start, end) {
                    debug!("drew wall ({:.0}, {:.0}) -> ({:.0}, {:.0})", start.x, start.z, end.x, end.z);
                }
            }
        }
        self.drag = None;
    }

    /// Mouse wheel; positive `delta_y` zooms out
    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.zoom(delta_y);
    }
}
