//! Session failure handling.
//!
//! A tracking failure moves the session into [`SessionStatus::Failed`] and asks the user to
//! confirm recovery. Nothing retries on its own: only [`ConfirmRecovery`] clears the messages
//! and restarts tracking, and the status returns to normal when the restarted session
//! delivers its first pose.

use bevy::prelude::*;

use crate::collection::MessageCollection;
use crate::config::AnchorConfig;
use crate::events::ConfirmRecovery;
use crate::events::RecoveryRequested;
use crate::events::RestartSession;
use crate::events::SessionRestarted;
use crate::events::TrackingFailed;
use crate::session::TrackingSession;

/// Health of the tracking session as seen by the update pass
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Normal,
    Failed {
        diagnostic:         String,
        /// Set once the user confirmed and the restart was issued
        recovery_confirmed: bool,
    },
}

impl SessionStatus {
    pub const fn is_failed(&self) -> bool { matches!(self, Self::Failed { .. }) }

    /// Failed and still waiting for the user
    pub const fn is_awaiting_confirmation(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                recovery_confirmed: false,
                ..
            }
        )
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Normal => None,
            Self::Failed { diagnostic, .. } => Some(diagnostic.as_str()),
        }
    }
}

/// Restarts tracking, removing every message first when anchors are invalidated.
///
/// Messages reference anchors, so invalidating anchors without clearing the collection would
/// leave orphans. Doing both here means the next tick always sees the cleared collection.
pub fn restart_tracking(
    commands: &mut Commands,
    collection: &mut MessageCollection,
    session: &mut TrackingSession,
    clear_anchors: bool,
) {
    if clear_anchors {
        collection.clear_all(commands);
    }
    session.restart(clear_anchors);

    commands.trigger(SessionRestarted {
        cleared_anchors: clear_anchors,
    });
}

/// Observer for `TrackingFailed` - pauses updates and prompts the user
pub fn on_tracking_failed(
    failed: On<TrackingFailed>,
    mut commands: Commands,
    config: Res<AnchorConfig>,
    mut status: ResMut<SessionStatus>,
    mut session: ResMut<TrackingSession>,
) {
    let diagnostic = failed.0.diagnostic();

    if status.is_failed() {
        warn!("Tracking session failed again: {diagnostic:?}");
    } else {
        warn!("Tracking session failed: {diagnostic:?}");
    }

    session.invalidate_pose();
    *status = SessionStatus::Failed {
        diagnostic:         diagnostic.clone(),
        recovery_confirmed: false,
    };

    commands.trigger(RecoveryRequested {
        title: config.recovery_title.clone(),
        diagnostic,
        action_label: config.recovery_action_label.clone(),
    });
}

/// Observer for `ConfirmRecovery` - clears all messages and restarts tracking, once per
/// failure
pub fn on_confirm_recovery(
    _confirm: On<ConfirmRecovery>,
    mut commands: Commands,
    mut status: ResMut<SessionStatus>,
    mut collection: ResMut<MessageCollection>,
    mut session: ResMut<TrackingSession>,
) {
    let SessionStatus::Failed {
        recovery_confirmed, ..
    } = &mut *status
    else {
        debug!("ConfirmRecovery: session is not failed, ignoring");
        return;
    };

    if *recovery_confirmed {
        debug!("ConfirmRecovery: restart already issued, ignoring");
        return;
    }
    *recovery_confirmed = true;

    info!("ConfirmRecovery: clearing messages and restarting tracking");
    restart_tracking(&mut commands, &mut collection, &mut session, true);
}

/// Observer for `RestartSession` - explicit restart outside of failure recovery
pub fn on_restart_session(
    restart: On<RestartSession>,
    mut commands: Commands,
    mut collection: ResMut<MessageCollection>,
    mut session: ResMut<TrackingSession>,
) {
    restart_tracking(
        &mut commands,
        &mut collection,
        &mut session,
        restart.clear_anchors,
    );
}
