// bevy_anchored_messages
// Text messages anchored at fixed points in world space, providing:
// - Per-tick screen projection and line-of-sight visibility against a tracked camera
// - A message collection driven by gesture events (place, drag, edit, delete, clear)
// - Tracking session adapter with user-confirmed failure recovery

use bevy::prelude::*;

mod collection;
mod config;
mod events;
mod geometry;
mod gestures;
mod message;
mod orbit;
#[cfg(feature = "visualization")]
mod overlay;
pub mod prelude;
mod recovery;
mod session;
mod update;

// Public API - Events (tracking engine → core)
pub use events::GeoAvailabilityChanged;
pub use events::TrackingFailed;
pub use events::TrackingFrame;
pub use events::TrackingTick;

// Public API - Events (gesture layer → core)
pub use events::BeginDrag;
pub use events::BeginEdit;
pub use events::ClearMessages;
pub use events::CommitEdit;
pub use events::DeleteMessage;
pub use events::EndDrag;
pub use events::EndEdit;
pub use events::MoveMessage;
pub use events::PlaceMessage;
pub use events::UpdateDrag;

// Public API - Events (session control)
pub use events::ConfirmRecovery;
pub use events::RestartSession;

// Public API - Events (core → observers)
pub use events::MessagePlaced;
pub use events::MessageRemoved;
pub use events::RecoveryRequested;
pub use events::SessionRecovered;
pub use events::SessionRestarted;

// Public API - Components and resources
pub use collection::MessageCollection;
pub use collection::MessageHandle;
pub use collection::MessageQuery;
pub use message::AnchoredMessage;
pub use recovery::SessionStatus;
pub use session::TrackingSession;

// Public API - Identities and value types
pub use geometry::CameraPose;
pub use geometry::MessageProjection;
pub use message::AnchorId;
pub use message::MessageId;
pub use session::GeoAvailability;
pub use session::GeoPose;
pub use session::RunOptions;
pub use session::TrackingMode;

// Public API - Errors
pub use collection::MessageError;
pub use session::SessionError;
pub use session::TrackingError;

// Public API - Traits
pub use session::TrackingBackend;

// Public API - Configuration resources
pub use config::AnchorConfig;
pub use config::Viewport;

// Public API - Utility functions
pub use geometry::is_visible;
pub use geometry::project_message;
pub use geometry::project_point;
pub use recovery::restart_tracking;
pub use update::run_projection_pass;

// Public API - Plugins
pub use orbit::OrbitCameraBackend;
pub use orbit::OrbitTrackingPlugin;
pub use orbit::OrbitTrackingSystems;
#[cfg(feature = "visualization")]
pub use overlay::MessageLabel;
#[cfg(feature = "visualization")]
pub use overlay::MessageOverlayConfig;
#[cfg(feature = "visualization")]
pub use overlay::MessageOverlayPlugin;

// Internal - used by plugin, not for external use
use gestures::on_begin_drag;
use gestures::on_begin_edit;
use gestures::on_clear_messages;
use gestures::on_commit_edit;
use gestures::on_delete_message;
use gestures::on_end_drag;
use gestures::on_end_edit;
use gestures::on_move_message;
use gestures::on_place_message;
use gestures::on_update_drag;
use recovery::on_confirm_recovery;
use recovery::on_restart_session;
use recovery::on_tracking_failed;
use session::on_geo_availability_changed;
use session::receive_tracking_frame;
use session::release_anchor_on_remove;
use update::update_message_projections;

/// Plugin that adds message anchoring.
///
/// Requires a [`TrackingSession`] resource. Create it with [`TrackingSession::start`] before
/// adding the plugin; a device without tracking support cannot run the app.
pub struct AnchoredMessagesPlugin;

impl Plugin for AnchoredMessagesPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<TrackingSession>() {
            warn!(
                "AnchoredMessagesPlugin: no TrackingSession resource yet, insert one before triggering any event"
            );
        }

        app
            // Tracking session
            .add_observer(receive_tracking_frame)
            .add_observer(on_geo_availability_changed)
            .add_observer(release_anchor_on_remove)
            // Per-tick projection
            .add_observer(update_message_projections)
            // Failure handling
            .add_observer(on_tracking_failed)
            .add_observer(on_confirm_recovery)
            .add_observer(on_restart_session)
            // Gestures
            .add_observer(on_place_message)
            .add_observer(on_begin_drag)
            .add_observer(on_update_drag)
            .add_observer(on_end_drag)
            .add_observer(on_move_message)
            .add_observer(on_begin_edit)
            .add_observer(on_commit_edit)
            .add_observer(on_end_edit)
            .add_observer(on_delete_message)
            .add_observer(on_clear_messages)
            // Resources
            .init_resource::<AnchorConfig>()
            .init_resource::<Viewport>()
            .init_resource::<MessageCollection>()
            .init_resource::<SessionStatus>()
            .register_type::<AnchoredMessage>()
            .register_type::<AnchorConfig>()
            .register_type::<Viewport>();
    }
}
