//! Observers for gesture-layer intents.
//!
//! Every intent that names a message resolves it through the collection first. A stale id
//! (the message was deleted or cleared in the meantime) is logged and ignored.

use bevy::prelude::*;

use crate::collection::MessageCollection;
use crate::events::BeginDrag;
use crate::events::BeginEdit;
use crate::events::ClearMessages;
use crate::events::CommitEdit;
use crate::events::DeleteMessage;
use crate::events::EndDrag;
use crate::events::EndEdit;
use crate::events::MoveMessage;
use crate::events::PlaceMessage;
use crate::events::UpdateDrag;
use crate::message::AnchoredMessage;
use crate::message::MessageId;
use crate::session::TrackingSession;

fn resolve(collection: &MessageCollection, id: MessageId, intent: &str) -> Option<Entity> {
    let entity = collection.entity(id);
    if entity.is_none() {
        warn!("{intent}: unknown {id}, ignoring");
    }
    entity
}

/// Observer for `PlaceMessage` - anchors a new message in the world
pub fn on_place_message(
    place: On<PlaceMessage>,
    mut commands: Commands,
    mut collection: ResMut<MessageCollection>,
    mut session: ResMut<TrackingSession>,
) {
    let anchor = session.add_anchor(&place.transform);
    collection.add(&mut commands, place.transform, place.text.clone(), anchor);
}

pub fn on_begin_drag(
    drag: On<BeginDrag>,
    collection: Res<MessageCollection>,
    mut messages: Query<&mut AnchoredMessage>,
) {
    let Some(entity) = resolve(&collection, drag.message, "BeginDrag") else {
        return;
    };
    let Ok(mut message) = messages.get_mut(entity) else {
        return;
    };
    message.begin_drag();
}

/// Observer for `UpdateDrag` - moves the message and its anchor
pub fn on_update_drag(
    drag: On<UpdateDrag>,
    collection: Res<MessageCollection>,
    mut session: ResMut<TrackingSession>,
    mut messages: Query<(&AnchoredMessage, &mut Transform)>,
) {
    let Some(entity) = resolve(&collection, drag.message, "UpdateDrag") else {
        return;
    };
    let Ok((message, mut transform)) = messages.get_mut(entity) else {
        return;
    };

    if !message.is_dragging() {
        debug!("UpdateDrag: {} is not being dragged", drag.message);
    }

    *transform = drag.transform;
    session.update_anchor(message.anchor(), &drag.transform);
}

pub fn on_end_drag(
    drag: On<EndDrag>,
    collection: Res<MessageCollection>,
    mut messages: Query<&mut AnchoredMessage>,
) {
    let Some(entity) = resolve(&collection, drag.message, "EndDrag") else {
        return;
    };
    let Ok(mut message) = messages.get_mut(entity) else {
        return;
    };
    message.end_drag();
}

/// Observer for `MoveMessage` - replaces the world transform without a drag
pub fn on_move_message(
    moved: On<MoveMessage>,
    collection: Res<MessageCollection>,
    mut session: ResMut<TrackingSession>,
    mut messages: Query<(&AnchoredMessage, &mut Transform)>,
) {
    let Some(entity) = resolve(&collection, moved.message, "MoveMessage") else {
        return;
    };
    let Ok((message, mut transform)) = messages.get_mut(entity) else {
        return;
    };

    *transform = moved.transform;
    session.update_anchor(message.anchor(), &moved.transform);
}

pub fn on_begin_edit(
    edit: On<BeginEdit>,
    collection: Res<MessageCollection>,
    mut messages: Query<&mut AnchoredMessage>,
) {
    let Some(entity) = resolve(&collection, edit.message, "BeginEdit") else {
        return;
    };
    let Ok(mut message) = messages.get_mut(entity) else {
        return;
    };
    message.begin_edit();
}

pub fn on_commit_edit(
    edit: On<CommitEdit>,
    collection: Res<MessageCollection>,
    mut messages: Query<&mut AnchoredMessage>,
) {
    let Some(entity) = resolve(&collection, edit.message, "CommitEdit") else {
        return;
    };
    let Ok(mut message) = messages.get_mut(entity) else {
        return;
    };
    message.set_text(edit.text.clone());
}

pub fn on_end_edit(
    edit: On<EndEdit>,
    collection: Res<MessageCollection>,
    mut messages: Query<&mut AnchoredMessage>,
) {
    let Some(entity) = resolve(&collection, edit.message, "EndEdit") else {
        return;
    };
    let Ok(mut message) = messages.get_mut(entity) else {
        return;
    };
    message.end_edit();
}

pub fn on_delete_message(
    delete: On<DeleteMessage>,
    mut commands: Commands,
    mut collection: ResMut<MessageCollection>,
) {
    if let Err(error) = collection.remove(&mut commands, delete.message) {
        warn!("DeleteMessage: {error}, ignoring");
    }
}

pub fn on_clear_messages(
    _clear: On<ClearMessages>,
    mut commands: Commands,
    mut collection: ResMut<MessageCollection>,
) {
    collection.clear_all(&mut commands);
}
