//! The anchored message component and its identities.

use std::fmt;

use bevy::prelude::*;

use crate::geometry::MessageProjection;

/// Identity of a message within a [`MessageCollection`](crate::MessageCollection).
/// Never reused for the lifetime of the collection.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "message#{}", self.0) }
}

/// Identity of a world anchor held by the tracking session
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "anchor#{}", self.0) }
}

/// A text message fixed at a point in world space.
///
/// The entity's `Transform` is the message's world transform. It is written by the drag and
/// edit flow only; the per-tick update pass reads it and writes `projection` through
/// [`AnchoredMessage::apply_projection`].
///
/// While `is_editing` or `is_dragging` is set the message is skipped by the update pass, so
/// the position the user is manipulating is never overwritten. Begin/end calls must be
/// balanced by the caller; nothing here validates them.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(Transform)]
pub struct AnchoredMessage {
    id:              MessageId,
    anchor:          AnchorId,
    text:            String,
    is_editing:      bool,
    is_dragging:     bool,
    projection:      MessageProjection,
    screen_position: Option<Vec2>,
}

impl AnchoredMessage {
    pub fn new(id: MessageId, anchor: AnchorId, text: impl Into<String>) -> Self {
        Self {
            id,
            anchor,
            text: text.into(),
            is_editing: false,
            is_dragging: false,
            projection: MessageProjection::default(),
            screen_position: None,
        }
    }

    pub const fn id(&self) -> MessageId { self.id }

    pub const fn anchor(&self) -> AnchorId { self.anchor }

    pub fn text(&self) -> &str { &self.text }

    pub const fn is_editing(&self) -> bool { self.is_editing }

    pub const fn is_dragging(&self) -> bool { self.is_dragging }

    /// True while either interaction flag excludes the message from the update pass
    pub const fn is_interacting(&self) -> bool { self.is_editing || self.is_dragging }

    /// Last projection written by the update pass
    pub const fn projection(&self) -> &MessageProjection { &self.projection }

    /// Where the rendering layer should draw the message, `None` when it should be hidden
    pub const fn screen_position(&self) -> Option<Vec2> { self.screen_position }

    pub const fn is_drawable(&self) -> bool { self.screen_position.is_some() }

    pub const fn begin_edit(&mut self) { self.is_editing = true; }

    pub const fn end_edit(&mut self) { self.is_editing = false; }

    pub const fn begin_drag(&mut self) { self.is_dragging = true; }

    pub const fn end_drag(&mut self) { self.is_dragging = false; }

    pub fn set_text(&mut self, text: impl Into<String>) { self.text = text.into(); }

    /// Stores a fresh projection and immediately derives the screen position from it
    pub fn apply_projection(&mut self, projection: MessageProjection) {
        self.projection = projection;
        self.update_screen_position();
    }

    // An unprojectable anchor is hidden even if the line-of-sight test passed.
    fn update_screen_position(&mut self) {
        self.screen_position = self
            .projection
            .screen_point
            .filter(|_| self.projection.is_visible);
    }
}
