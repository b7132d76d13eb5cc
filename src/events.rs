//! Events flowing into and out of the message anchoring core.
//!
//! Inputs are triggered by the host: the tracking engine integration, the gesture layer and
//! the recovery UI. Outputs are triggered by the core for whoever wants to observe them.

use bevy::prelude::*;

use crate::geometry::CameraPose;
use crate::message::AnchorId;
use crate::message::MessageId;
use crate::session::GeoAvailability;
use crate::session::GeoPose;
use crate::session::TrackingError;

// ============================================================================
// Tracking engine → core
// ============================================================================

/// One tracking update from the engine.
///
/// `camera` is `None` while the session is not localized; such frames skip the update pass.
#[derive(Event, Reflect, Debug, Clone, Default)]
#[reflect(Event, FromReflect)]
pub struct TrackingFrame {
    pub camera: Option<CameraPose>,
    pub geo:    Option<GeoPose>,
}

impl TrackingFrame {
    pub const fn new(camera: CameraPose) -> Self {
        Self {
            camera: Some(camera),
            geo:    None,
        }
    }

    /// Frame delivered before the session has a pose
    pub const fn unlocalized() -> Self {
        Self {
            camera: None,
            geo:    None,
        }
    }

    pub fn with_geo(mut self, geo: GeoPose) -> Self {
        self.geo = Some(geo);
        self
    }
}

/// Late answer to the geo tracking availability check
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct GeoAvailabilityChanged(pub GeoAvailability);

/// The tracking session failed and needs user-confirmed recovery
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct TrackingFailed(pub TrackingError);

/// Fired once per accepted tracking frame after the session pose is updated.
/// The projection pass runs in response.
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Event, FromReflect)]
pub struct TrackingTick;

// ============================================================================
// Gesture layer → core
// ============================================================================

/// Place a new message at a world transform
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct PlaceMessage {
    pub transform: Transform,
    pub text:      String,
}

impl PlaceMessage {
    pub fn new(transform: Transform, text: impl Into<String>) -> Self {
        Self {
            transform,
            text: text.into(),
        }
    }
}

#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct BeginDrag {
    pub message: MessageId,
}

/// Move a message that is being dragged
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct UpdateDrag {
    pub message:   MessageId,
    pub transform: Transform,
}

#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct EndDrag {
    pub message: MessageId,
}

/// Replace a message's world transform outside of a drag
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct MoveMessage {
    pub message:   MessageId,
    pub transform: Transform,
}

#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct BeginEdit {
    pub message: MessageId,
}

/// Store the text typed while editing
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct CommitEdit {
    pub message: MessageId,
    pub text:    String,
}

#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct EndEdit {
    pub message: MessageId,
}

#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct DeleteMessage {
    pub message: MessageId,
}

/// Remove every message
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Event, FromReflect)]
pub struct ClearMessages;

// ============================================================================
// Session control
// ============================================================================

/// The user accepted the recovery prompt
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Event, FromReflect)]
pub struct ConfirmRecovery;

/// Re-run the tracking session. With `clear_anchors` every message is removed first.
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Event, FromReflect)]
pub struct RestartSession {
    pub clear_anchors: bool,
}

// ============================================================================
// Core → observers
// ============================================================================

/// A message was added to the collection
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct MessagePlaced {
    pub message: MessageId,
    pub entity:  Entity,
}

/// A message left the collection. The session releases `anchor` in response.
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct MessageRemoved {
    pub message: MessageId,
    pub entity:  Entity,
    pub anchor:  AnchorId,
}

/// Ask the user to confirm recovery after a tracking failure
#[derive(Event, Reflect, Debug, Clone)]
#[reflect(Event, FromReflect)]
pub struct RecoveryRequested {
    pub title:        String,
    pub diagnostic:   String,
    pub action_label: String,
}

/// The tracking session was re-run
#[derive(Event, Reflect, Debug, Clone, Copy)]
#[reflect(Event, FromReflect)]
pub struct SessionRestarted {
    pub cleared_anchors: bool,
}

/// First pose received after a confirmed recovery
#[derive(Event, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Event, FromReflect)]
pub struct SessionRecovered;
