//! On-screen labels for anchored messages
//!
//! Reads each message's screen position and draws its text as an absolutely positioned UI
//! node. Labels never write back to the messages.

use bevy::prelude::*;

use crate::message::AnchoredMessage;
use crate::orbit::OrbitTrackingSystems;

const LABEL_FONT_SIZE: f32 = 18.0;

/// Appearance of message labels
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct MessageOverlayConfig {
    pub text_color:       Color,
    pub editing_color:    Color,
    pub background_color: Color,
    pub font_size:        f32,
}

impl Default for MessageOverlayConfig {
    fn default() -> Self {
        Self {
            text_color:       Color::WHITE,
            editing_color:    Color::srgb(1.0, 1.0, 0.0), // Yellow
            background_color: Color::srgba(0.0, 0.0, 0.0, 0.6),
            font_size:        LABEL_FONT_SIZE,
        }
    }
}

/// Label node drawing the message on `message`
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct MessageLabel {
    pub message: Entity,
}

/// Plugin that renders every anchored message as a UI label
pub struct MessageOverlayPlugin;

impl Plugin for MessageOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MessageOverlayConfig>().add_systems(
            PostUpdate,
            (cleanup_orphan_labels, sync_message_labels)
                .chain()
                .after(OrbitTrackingSystems),
        );
    }
}

/// Creates missing labels and moves existing ones to their message's screen position
fn sync_message_labels(
    mut commands: Commands,
    config: Res<MessageOverlayConfig>,
    messages: Query<(Entity, &AnchoredMessage)>,
    mut label_query: Query<(&MessageLabel, &mut Text, &mut Node, &mut TextColor, &mut Visibility)>,
) {
    let mut labelled = Vec::new();

    for (label, mut text, mut node, mut text_color, mut visibility) in &mut label_query {
        let Ok((_, message)) = messages.get(label.message) else {
            continue;
        };
        labelled.push(label.message);

        if text.as_str() != message.text() {
            **text = message.text().to_string();
        }
        text_color.0 = label_color(message, &config);

        match message.screen_position() {
            Some(position) => {
                node.left = Val::Px(position.x);
                node.top = Val::Px(position.y);
                *visibility = Visibility::Inherited;
            },
            None => *visibility = Visibility::Hidden,
        }
    }

    for (entity, message) in &messages {
        if labelled.contains(&entity) {
            continue;
        }

        let (left, top, visibility) = match message.screen_position() {
            Some(position) => (
                Val::Px(position.x),
                Val::Px(position.y),
                Visibility::Inherited,
            ),
            None => (Val::Auto, Val::Auto, Visibility::Hidden),
        };

        commands.spawn((
            Text::new(message.text()),
            TextFont {
                font_size: config.font_size,
                ..default()
            },
            TextColor(label_color(message, &config)),
            BackgroundColor(config.background_color),
            Node {
                position_type: PositionType::Absolute,
                left,
                top,
                ..default()
            },
            visibility,
            MessageLabel { message: entity },
        ));
    }
}

const fn label_color(message: &AnchoredMessage, config: &MessageOverlayConfig) -> Color {
    if message.is_editing() {
        config.editing_color
    } else {
        config.text_color
    }
}

/// Despawns labels whose message is gone
fn cleanup_orphan_labels(
    mut commands: Commands,
    messages: Query<(), With<AnchoredMessage>>,
    label_query: Query<(Entity, &MessageLabel)>,
) {
    for (entity, label) in &label_query {
        if messages.get(label.message).is_err() {
            commands.entity(entity).despawn();
        }
    }
}
