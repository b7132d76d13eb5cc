//! Tracking session adapter.
//!
//! Wraps the device's world-tracking engine behind [`TrackingBackend`] and exposes what the
//! rest of the crate needs from it: the current camera pose, the optional geographic pose,
//! anchor bookkeeping, and restart. Tracking frames arrive as [`TrackingFrame`] events and are
//! turned into [`TrackingTick`]s for the update pass.

use std::collections::HashSet;

use bevy::prelude::*;
use thiserror::Error;

use crate::config::AnchorConfig;
use crate::events::GeoAvailabilityChanged;
use crate::events::MessageRemoved;
use crate::events::SessionRecovered;
use crate::events::TrackingFrame;
use crate::events::TrackingTick;
use crate::geometry::CameraPose;
use crate::message::AnchorId;
use crate::recovery::SessionStatus;

// ============================================================================
// Errors
// ============================================================================

/// Startup failures. These are fatal: the application cannot run without tracking.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("world tracking is not supported on this device")]
    Unsupported,
}

/// Failure reported by the tracking engine.
///
/// Every part is optional. [`TrackingError::diagnostic`] joins the parts that are present,
/// one per line, and is also the `Display` text.
#[derive(Reflect, Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.diagnostic())]
pub struct TrackingError {
    pub description:         Option<String>,
    pub failure_reason:      Option<String>,
    pub recovery_suggestion: Option<String>,
}

impl TrackingError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..default()
        }
    }

    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Human-readable text for the recovery prompt
    pub fn diagnostic(&self) -> String {
        [
            &self.description,
            &self.failure_reason,
            &self.recovery_suggestion,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect::<Vec<_>>()
        .join("\n")
    }
}

// ============================================================================
// Backend boundary
// ============================================================================

/// Which configuration the engine runs with
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackingMode {
    /// Pose relative to the world origin established at session start
    #[default]
    World,
    /// World tracking aligned to geographic coordinates
    Geo,
}

/// Options passed to [`TrackingBackend::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Drop every anchor the engine holds before running again
    pub remove_existing_anchors: bool,
}

/// Geographic pose of the device
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GeoPose {
    pub latitude:  f64,
    pub longitude: f64,
    pub altitude:  f64,
}

/// Answer to "can geo tracking run here?"
#[derive(Reflect, Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoAvailability {
    pub available: bool,
    pub error:     Option<TrackingError>,
}

impl GeoAvailability {
    pub const fn available() -> Self {
        Self {
            available: true,
            error:     None,
        }
    }

    pub const fn unavailable(error: Option<TrackingError>) -> Self {
        Self {
            available: false,
            error,
        }
    }
}

/// The device tracking engine.
///
/// Implementations forward to the platform; the session calls these from the world's thread.
/// Frames and failures flow the other way, as [`TrackingFrame`] and
/// [`TrackingFailed`](crate::TrackingFailed) events triggered by the integration.
pub trait TrackingBackend: Send + Sync + 'static {
    /// Whether world tracking can run at all on this device
    fn is_supported(&self) -> bool;

    /// Geo tracking availability. `None` means the answer is pending and will be delivered
    /// later through [`GeoAvailabilityChanged`].
    fn geo_availability(&self) -> Option<GeoAvailability> {
        Some(GeoAvailability::unavailable(None))
    }

    /// (Re)runs the engine with the given configuration
    fn run(&mut self, mode: TrackingMode, options: RunOptions);

    fn add_anchor(&mut self, _anchor: AnchorId, _transform: &Transform) {}

    fn update_anchor(&mut self, _anchor: AnchorId, _transform: &Transform) {}

    fn remove_anchor(&mut self, _anchor: AnchorId) {}
}

// ============================================================================
// Session
// ============================================================================

/// Running tracking session.
///
/// Owns the camera pose for the current frame. The pose is replaced on every frame and
/// dropped on restart or failure, so consumers must never cache it across ticks.
#[derive(Resource)]
pub struct TrackingSession {
    backend:       Box<dyn TrackingBackend>,
    mode:          TrackingMode,
    prefer_geo:    bool,
    camera_pose:   Option<CameraPose>,
    geo_pose:      Option<GeoPose>,
    anchors:       HashSet<AnchorId>,
    next_anchor:   u64,
    restart_count: u32,
    subscribed:    bool,
}

impl TrackingSession {
    /// Starts world tracking on `backend`, then tries to upgrade to geo tracking if
    /// configured to.
    pub fn start(
        backend: impl TrackingBackend,
        config: &AnchorConfig,
    ) -> Result<Self, SessionError> {
        if !backend.is_supported() {
            error!("Tracking session: world tracking is not supported on this device");
            return Err(SessionError::Unsupported);
        }

        let mut session = Self {
            backend:       Box::new(backend),
            mode:          TrackingMode::World,
            prefer_geo:    config.prefer_geo_tracking,
            camera_pose:   None,
            geo_pose:      None,
            anchors:       HashSet::new(),
            next_anchor:   0,
            restart_count: 0,
            subscribed:    true,
        };

        session
            .backend
            .run(TrackingMode::World, RunOptions::default());
        info!("Tracking session started in world mode");

        if session.prefer_geo {
            match session.backend.geo_availability() {
                Some(availability) => session.negotiate_geo(availability),
                None => debug!("Tracking session: geo availability pending"),
            }
        }

        Ok(session)
    }

    pub const fn mode(&self) -> TrackingMode { self.mode }

    /// Pose for the current tick, `None` until the session is localized
    pub const fn current_camera_pose(&self) -> Option<CameraPose> { self.camera_pose }

    pub const fn current_geo_pose(&self) -> Option<GeoPose> { self.geo_pose }

    pub const fn restart_count(&self) -> u32 { self.restart_count }

    pub const fn is_subscribed(&self) -> bool { self.subscribed }

    /// Resumes tick delivery
    pub fn subscribe(&mut self) {
        if !self.subscribed {
            debug!("Tracking session: tick delivery resumed");
        }
        self.subscribed = true;
    }

    /// Stops tick delivery. Frames arriving afterwards are dropped. Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        if self.subscribed {
            debug!("Tracking session: tick delivery stopped");
        }
        self.subscribed = false;
    }

    /// Switches to geo tracking when available. Unavailability is not an error; the session
    /// stays on world tracking.
    pub fn negotiate_geo(&mut self, availability: GeoAvailability) {
        if !self.prefer_geo || self.mode == TrackingMode::Geo {
            return;
        }

        if availability.available {
            info!("Tracking session: geo tracking available, switching");
            self.mode = TrackingMode::Geo;
            self.backend.run(TrackingMode::Geo, RunOptions::default());
        } else if let Some(error) = availability.error {
            info!("Tracking session: geo tracking unavailable ({error}), staying on world tracking");
        } else {
            info!("Tracking session: geo tracking unavailable, staying on world tracking");
        }
    }

    /// Re-runs the engine with the current mode.
    ///
    /// The pose is dropped until the next frame re-localizes. With `clear_anchors` every
    /// anchor is invalidated; the caller must remove the messages that referenced them
    /// (see [`restart_tracking`](crate::restart_tracking), the public entry point).
    pub(crate) fn restart(&mut self, clear_anchors: bool) {
        self.backend.run(
            self.mode,
            RunOptions {
                remove_existing_anchors: clear_anchors,
            },
        );
        self.camera_pose = None;
        self.geo_pose = None;
        if clear_anchors {
            self.anchors.clear();
        }
        self.restart_count += 1;

        info!(
            "Tracking session restarted (mode={:?} clear_anchors={clear_anchors} restarts={})",
            self.mode, self.restart_count
        );
    }

    /// Registers a new world anchor with the engine
    pub fn add_anchor(&mut self, transform: &Transform) -> AnchorId {
        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(anchor);
        self.backend.add_anchor(anchor, transform);
        anchor
    }

    pub fn update_anchor(&mut self, anchor: AnchorId, transform: &Transform) {
        if self.anchors.contains(&anchor) {
            self.backend.update_anchor(anchor, transform);
        } else {
            debug!("Tracking session: update for unknown {anchor} ignored");
        }
    }

    /// Tells the engine to drop an anchor. Returns `false` if the anchor was already gone.
    pub fn release_anchor(&mut self, anchor: AnchorId) -> bool {
        if !self.anchors.remove(&anchor) {
            trace!("Tracking session: {anchor} already released");
            return false;
        }
        self.backend.remove_anchor(anchor);
        true
    }

    pub fn has_anchor(&self, anchor: AnchorId) -> bool { self.anchors.contains(&anchor) }

    pub fn anchor_count(&self) -> usize { self.anchors.len() }

    pub(crate) fn invalidate_pose(&mut self) {
        self.camera_pose = None;
        self.geo_pose = None;
    }

    fn receive_frame(&mut self, camera: Option<CameraPose>, geo: Option<GeoPose>) {
        self.camera_pose = camera;
        self.geo_pose = geo;
    }
}

// ============================================================================
// Observers
// ============================================================================

/// Observer for `TrackingFrame` - stores the pose and fires the tick.
///
/// Frames are dropped while unsubscribed or while a failure awaits the user's confirmation.
/// After a confirmed recovery the first frame carrying a pose returns the session to normal.
pub fn receive_tracking_frame(
    frame: On<TrackingFrame>,
    mut commands: Commands,
    mut session: ResMut<TrackingSession>,
    mut status: ResMut<SessionStatus>,
) {
    if !session.is_subscribed() {
        trace!("TrackingFrame: not subscribed, dropped");
        return;
    }

    if status.is_awaiting_confirmation() {
        trace!("TrackingFrame: session failed, awaiting recovery confirmation");
        return;
    }

    if status.is_failed() && frame.camera.is_some() {
        *status = SessionStatus::Normal;
        info!("Tracking session recovered");
        commands.trigger(SessionRecovered);
    }

    session.receive_frame(frame.camera, frame.geo);
    commands.trigger(TrackingTick);
}

/// Observer for `GeoAvailabilityChanged` - completes a pending geo negotiation
pub fn on_geo_availability_changed(
    changed: On<GeoAvailabilityChanged>,
    mut session: ResMut<TrackingSession>,
) {
    session.negotiate_geo(changed.0.clone());
}

/// Observer for `MessageRemoved` - releases the message's world anchor
pub fn release_anchor_on_remove(removed: On<MessageRemoved>, mut session: ResMut<TrackingSession>) {
    session.release_anchor(removed.anchor);
}
