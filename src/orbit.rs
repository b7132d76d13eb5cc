//! Desktop stand-in for a device tracker.
//!
//! Uses a `PanOrbitCamera` as the tracked camera: its global transform is delivered as a
//! [`TrackingFrame`] every frame and its viewport and field of view keep [`Viewport`] in sync.

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::config::Viewport;
use crate::events::TrackingFrame;
use crate::geometry::CameraPose;
use crate::session::RunOptions;
use crate::session::TrackingBackend;
use crate::session::TrackingMode;

/// Backend for [`OrbitTrackingPlugin`]. Always supported, never geo-capable; runs are logged.
#[derive(Debug, Default)]
pub struct OrbitCameraBackend;

impl TrackingBackend for OrbitCameraBackend {
    fn is_supported(&self) -> bool { true }

    fn run(&mut self, mode: TrackingMode, options: RunOptions) {
        debug!(
            "OrbitCameraBackend: run mode={mode:?} remove_existing_anchors={}",
            options.remove_existing_anchors
        );
    }
}

/// Systems that deliver the orbit camera's tracking frame. Runs in `PostUpdate` once transforms
/// are propagated, so the pose and the projections it triggers belong to the current frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrbitTrackingSystems;

/// Feeds tracking frames from the `PanOrbitCamera`
pub struct OrbitTrackingPlugin;

impl Plugin for OrbitTrackingPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            PostUpdate,
            OrbitTrackingSystems.after(TransformSystems::Propagate),
        )
        .add_systems(
            PostUpdate,
            (sync_viewport_from_camera, emit_orbit_camera_frames)
                .chain()
                .in_set(OrbitTrackingSystems),
        );
    }
}

/// Copies the orbit camera's logical viewport size and perspective settings into `Viewport`
fn sync_viewport_from_camera(
    camera_query: Query<(&Camera, &Projection), With<PanOrbitCamera>>,
    mut viewport: ResMut<Viewport>,
) {
    let Ok((camera, projection)) = camera_query.single() else {
        return;
    };

    let Some(size) = camera.logical_viewport_size() else {
        return;
    };

    let Projection::Perspective(perspective) = projection else {
        return;
    };

    let synced = Viewport::new(size, perspective.fov, perspective.near);
    if *viewport != synced {
        *viewport = synced;
    }
}

/// Delivers the orbit camera pose as this frame's tracking update
fn emit_orbit_camera_frames(
    mut commands: Commands,
    camera_query: Query<&GlobalTransform, With<PanOrbitCamera>>,
) {
    let Ok(global_transform) = camera_query.single() else {
        return;
    };

    commands.trigger(TrackingFrame::new(CameraPose::from(global_transform)));
}

#[cfg(test)]
mod tests {
    use bevy::transform::TransformPlugin;

    use super::*;

    #[derive(Resource, Default)]
    struct Frames(Vec<CameraPose>);

    #[test]
    fn frame_carries_this_frames_camera_transform() {
        let mut app = App::new();
        app.add_plugins((TransformPlugin, OrbitTrackingPlugin))
            .init_resource::<Viewport>()
            .init_resource::<Frames>()
            .add_observer(|frame: On<TrackingFrame>, mut frames: ResMut<Frames>| {
                frames.0.extend(frame.camera);
            });

        app.world_mut()
            .spawn((PanOrbitCamera::default(), Transform::from_xyz(1.0, 2.0, 3.0)));
        app.update();

        let frames = &app.world().resource::<Frames>().0;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].translation(), Vec3::new(1.0, 2.0, 3.0));
    }
}
