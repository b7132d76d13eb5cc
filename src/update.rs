//! Per-tick projection pass

use bevy::prelude::*;

use crate::collection::MessageCollection;
use crate::collection::MessageHandle;
use crate::collection::MessageQuery;
use crate::config::Viewport;
use crate::events::TrackingTick;
use crate::geometry::CameraPose;
use crate::geometry::project_message;
use crate::recovery::SessionStatus;
use crate::session::TrackingSession;

/// Observer for `TrackingTick` - recomputes projection and visibility of every eligible
/// message against the current camera pose.
///
/// Without a pose (not localized yet, restarting, failed) the whole tick is skipped so no
/// message is left with a partial update.
pub fn update_message_projections(
    _tick: On<TrackingTick>,
    session: Res<TrackingSession>,
    status: Res<SessionStatus>,
    viewport: Res<Viewport>,
    collection: Res<MessageCollection>,
    mut messages: MessageQuery,
) {
    if status.is_failed() {
        return;
    }

    let Some(pose) = session.current_camera_pose() else {
        trace!("TrackingTick: no camera pose, skipping");
        return;
    };

    let eligible = collection.eligible_for_update(&messages);
    let updated = run_projection_pass(&pose, &viewport, &eligible, &mut messages);

    trace!(
        "TrackingTick: projected {updated}/{} messages",
        collection.len()
    );
}

/// Projects every message in `snapshot` and writes the result into it.
///
/// Handles whose entity no longer exists are skipped. Returns how many messages were updated.
pub fn run_projection_pass(
    pose: &CameraPose,
    viewport: &Viewport,
    snapshot: &[MessageHandle],
    messages: &mut MessageQuery,
) -> usize {
    let mut updated = 0;

    for handle in snapshot {
        let Ok((mut message, transform)) = messages.get_mut(handle.entity) else {
            continue;
        };

        let projection = project_message(pose, viewport, transform.translation);
        message.apply_projection(projection);
        updated += 1;
    }

    updated
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::geometry::MessageProjection;
    use crate::message::AnchorId;
    use crate::message::AnchoredMessage;
    use crate::message::MessageId;

    #[derive(Resource)]
    struct Snapshot(Vec<MessageHandle>);

    fn spawn_message(app: &mut App, id: u64, translation: Vec3) -> MessageHandle {
        let entity = app
            .world_mut()
            .spawn((
                AnchoredMessage::new(MessageId(id), AnchorId(id), "note"),
                Transform::from_translation(translation),
            ))
            .id();
        MessageHandle {
            id: MessageId(id),
            entity,
        }
    }

    fn project_snapshot(snapshot: Res<Snapshot>, mut messages: MessageQuery) -> usize {
        let pose = CameraPose::from(Transform::IDENTITY);
        run_projection_pass(&pose, &Viewport::default(), &snapshot.0, &mut messages)
    }

    #[test]
    fn pass_writes_projection_for_each_handle() {
        let mut app = App::new();
        let ahead = spawn_message(&mut app, 0, Vec3::new(0.0, 0.0, -2.0));
        let behind = spawn_message(&mut app, 1, Vec3::new(0.0, 0.0, 2.0));
        app.insert_resource(Snapshot(vec![ahead, behind]));

        let updated = app.world_mut().run_system_once(project_snapshot).unwrap();

        assert_eq!(updated, 2);
        let ahead = app.world().get::<AnchoredMessage>(ahead.entity).unwrap();
        assert!(ahead.projection().is_drawable());
        let behind = app.world().get::<AnchoredMessage>(behind.entity).unwrap();
        assert_eq!(*behind.projection(), MessageProjection::new(None, false));
    }

    #[test]
    fn stale_handles_are_skipped() {
        let mut app = App::new();
        let kept = spawn_message(&mut app, 0, Vec3::new(0.0, 0.0, -2.0));
        let gone = spawn_message(&mut app, 1, Vec3::new(1.0, 0.0, -2.0));
        app.insert_resource(Snapshot(vec![gone, kept]));
        app.world_mut().despawn(gone.entity);

        let updated = app.world_mut().run_system_once(project_snapshot).unwrap();

        assert_eq!(updated, 1);
        let kept = app.world().get::<AnchoredMessage>(kept.entity).unwrap();
        assert!(kept.screen_position().is_some());
    }
}
