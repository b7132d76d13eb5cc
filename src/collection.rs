//! Ownership of the live anchored messages

use bevy::prelude::*;
use thiserror::Error;

use crate::events::MessagePlaced;
use crate::events::MessageRemoved;
use crate::message::AnchorId;
use crate::message::AnchoredMessage;
use crate::message::MessageId;

/// Query shape shared by the update pass and [`MessageCollection::eligible_for_update`]
pub type MessageQuery<'w, 's> =
    Query<'w, 's, (&'static mut AnchoredMessage, &'static Transform)>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    /// The id was never issued or its message was already removed
    #[error("no live message with id {0}")]
    UnknownMessage(MessageId),
}

/// Copyable reference to a message in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub id:     MessageId,
    pub entity: Entity,
}

#[derive(Debug, Clone, Copy)]
struct MessageEntry {
    id:     MessageId,
    entity: Entity,
    anchor: AnchorId,
}

impl MessageEntry {
    const fn handle(&self) -> MessageHandle {
        MessageHandle {
            id:     self.id,
            entity: self.entity,
        }
    }
}

/// The set of live messages, in placement order.
///
/// The collection owns the message entities: `add` spawns them and `remove`/`clear_all`
/// despawn them. Ids come from a counter and are never reused, so no two live messages share
/// one.
#[derive(Resource, Debug, Default)]
pub struct MessageCollection {
    entries: Vec<MessageEntry>,
    next_id: u64,
}

impl MessageCollection {
    pub const fn len(&self) -> usize { self.entries.len() }

    pub const fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains(&self, id: MessageId) -> bool { self.position(id).is_some() }

    pub fn entity(&self, id: MessageId) -> Option<Entity> {
        self.position(id).map(|index| self.entries[index].entity)
    }

    /// Handles of every live message in placement order
    pub fn handles(&self) -> impl Iterator<Item = MessageHandle> + '_ {
        self.entries.iter().map(MessageEntry::handle)
    }

    /// Spawns a message entity at `transform` and assigns it a fresh id
    pub fn add(
        &mut self,
        commands: &mut Commands,
        transform: Transform,
        text: impl Into<String>,
        anchor: AnchorId,
    ) -> MessageHandle {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        let entity = commands
            .spawn((AnchoredMessage::new(id, anchor, text), transform))
            .id();
        let entry = MessageEntry { id, entity, anchor };
        self.entries.push(entry);

        debug!("Placed {id} on {anchor} at {:.2?}", transform.translation);
        commands.trigger(MessagePlaced {
            message: id,
            entity,
        });

        entry.handle()
    }

    /// Removes one message, despawning its entity and releasing its anchor.
    /// An unknown id leaves the collection untouched.
    pub fn remove(
        &mut self,
        commands: &mut Commands,
        id: MessageId,
    ) -> Result<MessageHandle, MessageError> {
        let index = self.position(id).ok_or(MessageError::UnknownMessage(id))?;
        let entry = self.entries.remove(index);

        Self::despawn_entry(commands, entry);
        Ok(entry.handle())
    }

    /// Removes every message with the same cleanup as [`MessageCollection::remove`].
    /// Returns how many were removed.
    pub fn clear_all(&mut self, commands: &mut Commands) -> usize {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();

        for entry in entries {
            Self::despawn_entry(commands, entry);
        }

        if count > 0 {
            info!("Cleared {count} messages");
        }
        count
    }

    /// Point-in-time snapshot of messages that are neither being edited nor dragged, in
    /// placement order.
    ///
    /// Handles stay valid to hold across the pass; a message removed after the snapshot simply
    /// fails to resolve and is skipped.
    pub fn eligible_for_update(&self, messages: &MessageQuery) -> Vec<MessageHandle> {
        self.entries
            .iter()
            .filter(|entry| {
                messages
                    .get(entry.entity)
                    .is_ok_and(|(message, _)| !message.is_interacting())
            })
            .map(MessageEntry::handle)
            .collect()
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn despawn_entry(commands: &mut Commands, entry: MessageEntry) {
        commands.entity(entry.entity).despawn();
        commands.trigger(MessageRemoved {
            message: entry.id,
            entity:  entry.entity,
            anchor:  entry.anchor,
        });
        debug!("Removed {} and released {}", entry.id, entry.anchor);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    #[derive(Resource, Default)]
    struct Placed(Vec<MessageHandle>);

    fn place_three(mut commands: Commands, mut collection: ResMut<MessageCollection>) {
        let handles = (0..3)
            .map(|i| {
                collection.add(
                    &mut commands,
                    Transform::from_xyz(i as f32, 0.0, -1.0),
                    format!("note {i}"),
                    AnchorId(i),
                )
            })
            .collect();
        commands.insert_resource(Placed(handles));
    }

    fn eligible(collection: Res<MessageCollection>, messages: MessageQuery) -> Vec<MessageHandle> {
        collection.eligible_for_update(&messages)
    }

    fn app_with_three() -> App {
        let mut app = App::new();
        app.init_resource::<MessageCollection>();
        app.world_mut().run_system_once(place_three).unwrap();
        app
    }

    fn placed(app: &App) -> Vec<MessageHandle> { app.world().resource::<Placed>().0.clone() }

    #[test]
    fn add_assigns_unique_ids_in_order() {
        let app = app_with_three();
        let handles = placed(&app);
        let collection = app.world().resource::<MessageCollection>();

        assert_eq!(collection.len(), 3);
        assert_eq!(
            handles.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![MessageId(0), MessageId(1), MessageId(2)]
        );
        assert_eq!(collection.handles().collect::<Vec<_>>(), handles);
        for handle in &handles {
            assert!(app.world().get::<AnchoredMessage>(handle.entity).is_some());
        }
    }

    #[test]
    fn remove_despawns_entity() {
        let mut app = app_with_three();
        let target = placed(&app)[1];

        let removed = app
            .world_mut()
            .run_system_once(
                move |mut commands: Commands, mut collection: ResMut<MessageCollection>| {
                    collection.remove(&mut commands, target.id)
                },
            )
            .unwrap();

        assert_eq!(removed, Ok(target));
        let collection = app.world().resource::<MessageCollection>();
        assert_eq!(collection.len(), 2);
        assert!(!collection.contains(target.id));
        assert!(app.world().get_entity(target.entity).is_err());
    }

    #[test]
    fn removing_unknown_id_changes_nothing() {
        let mut app = app_with_three();
        let before = placed(&app);

        let result = app
            .world_mut()
            .run_system_once(
                |mut commands: Commands, mut collection: ResMut<MessageCollection>| {
                    collection.remove(&mut commands, MessageId(99))
                },
            )
            .unwrap();

        assert_eq!(result, Err(MessageError::UnknownMessage(MessageId(99))));
        let collection = app.world().resource::<MessageCollection>();
        assert_eq!(collection.handles().collect::<Vec<_>>(), before);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut app = app_with_three();
        let last = placed(&app)[2];

        let fresh = app
            .world_mut()
            .run_system_once(
                move |mut commands: Commands, mut collection: ResMut<MessageCollection>| {
                    let _ = collection.remove(&mut commands, last.id);
                    collection.add(&mut commands, Transform::default(), "again", AnchorId(10))
                },
            )
            .unwrap();

        assert_eq!(fresh.id, MessageId(3));
    }

    #[test]
    fn clear_all_empties_collection_and_is_safe_when_empty() {
        let mut app = app_with_three();
        let handles = placed(&app);

        let cleared = app
            .world_mut()
            .run_system_once(
                |mut commands: Commands, mut collection: ResMut<MessageCollection>| {
                    collection.clear_all(&mut commands)
                },
            )
            .unwrap();
        assert_eq!(cleared, 3);

        let again = app
            .world_mut()
            .run_system_once(
                |mut commands: Commands, mut collection: ResMut<MessageCollection>| {
                    collection.clear_all(&mut commands)
                },
            )
            .unwrap();
        assert_eq!(again, 0);

        assert!(app.world().resource::<MessageCollection>().is_empty());
        for handle in handles {
            assert!(app.world().get_entity(handle.entity).is_err());
        }
        assert!(app.world_mut().run_system_once(eligible).unwrap().is_empty());
    }

    #[test]
    fn eligible_skips_editing_and_dragging() {
        let mut app = app_with_three();
        let handles = placed(&app);

        let world = app.world_mut();
        world
            .get_mut::<AnchoredMessage>(handles[0].entity)
            .unwrap()
            .begin_edit();
        world
            .get_mut::<AnchoredMessage>(handles[2].entity)
            .unwrap()
            .begin_drag();

        let eligible = app.world_mut().run_system_once(eligible).unwrap();

        assert_eq!(eligible, vec![handles[1]]);
    }

    #[test]
    fn snapshot_skips_entities_despawned_behind_its_back() {
        let mut app = app_with_three();
        let handles = placed(&app);

        let snapshot = app.world_mut().run_system_once(eligible).unwrap();
        app.world_mut().despawn(handles[0].entity);

        let resolved = app
            .world_mut()
            .run_system_once(move |messages: MessageQuery| {
                snapshot
                    .iter()
                    .filter(|handle| messages.get(handle.entity).is_ok())
                    .count()
            })
            .unwrap();

        assert_eq!(resolved, 2);
    }
}
