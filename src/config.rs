//! Configuration resources for message anchoring

use std::f32::consts::FRAC_PI_3;

use bevy::prelude::*;

/// Behavior of the tracking session and recovery prompt
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct AnchorConfig {
    /// Attempt geographic tracking when the backend reports it as available
    pub prefer_geo_tracking:   bool,
    /// Title shown by the recovery UI after a tracking failure
    pub recovery_title:        String,
    /// Label of the single confirm action offered by the recovery UI
    pub recovery_action_label: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            prefer_geo_tracking:   true,
            recovery_title:        "The AR session failed.".to_string(),
            recovery_action_label: "Restart Session".to_string(),
        }
    }
}

/// Screen the messages are projected onto.
///
/// Coordinates produced against this viewport are logical pixels with the origin in the
/// top-left corner and y growing downward.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Resource)]
pub struct Viewport {
    /// Logical size in pixels
    pub size:  Vec2,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Points closer than this along the view direction do not project
    pub near:  f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size:  Vec2::new(1280.0, 720.0),
            fov_y: FRAC_PI_3,
            near:  0.01,
        }
    }
}

impl Viewport {
    pub const fn new(size: Vec2, fov_y: f32, near: f32) -> Self { Self { size, fov_y, near } }

    /// Width over height, `None` for an empty viewport
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.size.x > 0.0 && self.size.y > 0.0).then(|| self.size.x / self.size.y)
    }

    pub fn center(&self) -> Vec2 { self.size * 0.5 }
}
