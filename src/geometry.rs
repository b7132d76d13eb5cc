//! World-to-screen projection and line-of-sight tests.
//!
//! Everything here is pure math over a camera pose and a viewport. The per-tick update pass
//! combines [`project_point`] and [`is_visible`] through [`project_message`].

use bevy::prelude::*;

use crate::config::Viewport;

/// Position and orientation of the observing camera for one tick.
///
/// Stored as the camera-to-world matrix delivered by the tracking engine. The camera looks
/// down the negative of its third column, so [`CameraPose::forward_axis`] points backward
/// out of the screen.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub matrix: Mat4,
}

impl CameraPose {
    pub const fn new(matrix: Mat4) -> Self { Self { matrix } }

    /// Camera at `position` looking at `target` with `+Y` up
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Transform::from_translation(position)
            .looking_at(target, Vec3::Y)
            .into()
    }

    pub fn translation(&self) -> Vec3 { self.matrix.w_axis.truncate() }

    /// Third column of the pose matrix, the tracking engine's "camera forward"
    pub fn forward_axis(&self) -> Vec3 { self.matrix.z_axis.truncate().normalize_or_zero() }

    pub fn right(&self) -> Vec3 { self.matrix.x_axis.truncate().normalize_or_zero() }

    pub fn up(&self) -> Vec3 { self.matrix.y_axis.truncate().normalize_or_zero() }

    /// Direction the lens points in
    pub fn view_direction(&self) -> Vec3 { -self.forward_axis() }
}

impl From<Transform> for CameraPose {
    fn from(transform: Transform) -> Self { Self::new(transform.to_matrix()) }
}

impl From<&GlobalTransform> for CameraPose {
    fn from(transform: &GlobalTransform) -> Self { Self::new(transform.to_matrix()) }
}

/// Result of projecting one message for one tick.
///
/// Replaced wholesale on every update; never patched in place.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct MessageProjection {
    /// Viewport coordinates, `None` when the anchor could not be projected this tick
    pub screen_point: Option<Vec2>,
    /// Line-of-sight verdict from [`is_visible`]
    pub is_visible:   bool,
}

impl MessageProjection {
    pub const fn new(screen_point: Option<Vec2>, is_visible: bool) -> Self {
        Self {
            screen_point,
            is_visible,
        }
    }

    /// A projection can be drawn only when it is visible and has a screen point
    pub const fn is_drawable(&self) -> bool { self.is_visible && self.screen_point.is_some() }
}

/// Projects a world-space point into viewport coordinates.
///
/// Returns `None` if the viewport is empty, the point lies on or behind the near plane, or
/// the result is not finite. Points in front of the camera but outside the screen rectangle
/// still project, to coordinates outside `0..size`.
pub fn project_point(world_point: Vec3, pose: &CameraPose, viewport: &Viewport) -> Option<Vec2> {
    let aspect_ratio = viewport.aspect_ratio()?;

    let half_tan_vfov = (viewport.fov_y * 0.5).tan();
    let half_tan_hfov = half_tan_vfov * aspect_ratio;
    if !(half_tan_vfov.is_finite() && half_tan_vfov > 0.0) {
        return None;
    }

    let relative = world_point - pose.translation();
    let depth = relative.dot(pose.view_direction());

    if depth <= viewport.near {
        return None;
    }

    let norm_x = relative.dot(pose.right()) / depth;
    let norm_y = relative.dot(pose.up()) / depth;

    // Normalized device coordinates, -1..1 across the screen
    let ndc_x = norm_x / half_tan_hfov;
    let ndc_y = norm_y / half_tan_vfov;

    let screen = Vec2::new(
        (ndc_x + 1.0) * 0.5 * viewport.size.x,
        (1.0 - ndc_y) * 0.5 * viewport.size.y,
    );

    screen.is_finite().then_some(screen)
}

/// Line-of-sight test between the camera and a target.
///
/// `camera_forward` is the pose's third column ([`CameraPose::forward_axis`]). Since the
/// camera looks down its negative, a target is visible when the dot product with the
/// normalized camera-to-target direction is negative. A target at the camera position has no
/// direction and is reported as not visible.
pub fn is_visible(camera_forward: Vec3, camera_position: Vec3, target_position: Vec3) -> bool {
    let Some(direction) = (target_position - camera_position).try_normalize() else {
        return false;
    };

    camera_forward.dot(direction) < 0.0
}

/// Projection and visibility of a single anchor position for the given camera
pub fn project_message(
    pose: &CameraPose,
    viewport: &Viewport,
    world_position: Vec3,
) -> MessageProjection {
    let screen_point = project_point(world_position, pose, viewport);
    let visible = is_visible(pose.forward_axis(), pose.translation(), world_position);

    MessageProjection::new(screen_point, visible)
}
