//! Anchored messages on the desktop, with an orbit camera standing in for the device tracker.
//!
//! - Middle-drag to orbit, shift+middle-drag to pan, scroll to zoom
//! - Messages stay fixed in the world and hide when they are behind the camera
//! - Press 'F' to simulate a tracking failure, then 'R' to confirm recovery

use bevy::color::palettes::basic::SILVER;
use bevy::input::ButtonState;
use bevy::input::keyboard::Key;
use bevy::input::keyboard::KeyboardInput;
use bevy::prelude::*;
use bevy_anchored_messages::AnchorConfig;
use bevy_anchored_messages::AnchoredMessage;
use bevy_anchored_messages::AnchoredMessagesPlugin;
use bevy_anchored_messages::BeginDrag;
use bevy_anchored_messages::BeginEdit;
use bevy_anchored_messages::ClearMessages;
use bevy_anchored_messages::CommitEdit;
use bevy_anchored_messages::ConfirmRecovery;
use bevy_anchored_messages::DeleteMessage;
use bevy_anchored_messages::EndDrag;
use bevy_anchored_messages::EndEdit;
use bevy_anchored_messages::MessageCollection;
use bevy_anchored_messages::MessageId;
use bevy_anchored_messages::MessageOverlayPlugin;
use bevy_anchored_messages::MessagePlaced;
use bevy_anchored_messages::MessageRemoved;
use bevy_anchored_messages::MoveMessage;
use bevy_anchored_messages::OrbitCameraBackend;
use bevy_anchored_messages::OrbitTrackingPlugin;
use bevy_anchored_messages::PlaceMessage;
use bevy_anchored_messages::RecoveryRequested;
use bevy_anchored_messages::SessionRecovered;
use bevy_anchored_messages::SessionRestarted;
use bevy_anchored_messages::SessionStatus;
use bevy_anchored_messages::TrackingError;
use bevy_anchored_messages::TrackingFailed;
use bevy_anchored_messages::TrackingSession;
use bevy_anchored_messages::UpdateDrag;
use bevy_panorbit_camera::PanOrbitCamera;
use bevy_panorbit_camera::PanOrbitCameraPlugin;

const PLACE_DISTANCE: f32 = 3.0;
const MOVE_SPEED: f32 = 1.5;
const CAMERA_START_YAW: f32 = -0.2;
const CAMERA_START_PITCH: f32 = 0.3;
const CAMERA_START_RADIUS: f32 = 8.0;
const HELP_FONT_SIZE: f32 = 13.0;
const EVENT_LOG_FONT_SIZE: f32 = 14.0;
const EVENT_LINE_LIFETIME_SECS: f32 = 8.0;

const HELP_TEXT: &str = "Press:\n\
    'Space' place a message in front of the camera\n\
    'Tab' select the next message\n\
    'Arrows' move the selected message\n\
    'G' start/stop dragging\n\
    'Enter' start/stop editing (type to change the text)\n\
    'Delete' delete the selected message\n\
    'C' clear all messages\n\
    'F' simulate a tracking failure\n\
    'R' confirm recovery";

fn main() -> AppExit {
    let config = AnchorConfig::default();
    let session = match TrackingSession::start(OrbitCameraBackend, &config) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("Cannot start: {error}");
            return AppExit::error();
        },
    };

    App::new()
        .add_plugins((DefaultPlugins, PanOrbitCameraPlugin))
        .insert_resource(config)
        .insert_resource(session)
        .add_plugins((
            AnchoredMessagesPlugin,
            OrbitTrackingPlugin,
            MessageOverlayPlugin,
        ))
        .init_resource::<Selection>()
        .init_resource::<EventLog>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                place_message,
                cycle_selection,
                toggle_drag,
                toggle_edit,
                type_into_message,
                move_selected,
                delete_selected,
                clear_messages,
                simulate_failure,
                confirm_recovery,
                update_event_log_text,
            ),
        )
        .add_observer(log_message_placed)
        .add_observer(log_message_removed)
        .add_observer(show_recovery_prompt)
        .add_observer(log_session_restarted)
        .add_observer(hide_recovery_prompt)
        .run()
}

#[derive(Resource, Default)]
struct Selection {
    message:  Option<MessageId>,
    dragging: bool,
    editing:  bool,
    draft:    String,
    placed:   usize,
}

#[derive(Component)]
struct EventLogNode;

#[derive(Component)]
struct RecoveryPromptNode;

struct EventLine {
    text:      String,
    timestamp: f32,
}

#[derive(Resource, Default)]
struct EventLog {
    lines: Vec<EventLine>,
    dirty: bool,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Ground plane
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(materials.add(Color::from(SILVER))),
    ));

    // Landmarks to orbit around
    for (x, color) in [
        (-2.5, Color::srgb(0.5, 0.5, 0.9)),
        (0.0, Color::srgb(0.9, 0.3, 0.2)),
        (2.5, Color::srgb(0.3, 0.8, 0.4)),
    ] {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(color)),
            Transform::from_xyz(x, 0.5, 0.0),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 1500.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn(PanOrbitCamera {
        button_orbit: MouseButton::Middle,
        button_pan: MouseButton::Middle,
        modifier_pan: Some(KeyCode::ShiftLeft),
        yaw: Some(CAMERA_START_YAW),
        pitch: Some(CAMERA_START_PITCH),
        radius: Some(CAMERA_START_RADIUS),
        ..default()
    });

    // Instructions
    commands.spawn((
        Text::new(HELP_TEXT),
        TextFont {
            font_size: HELP_FONT_SIZE,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));

    // Event log display (top-right, grows downward)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: EVENT_LOG_FONT_SIZE,
            ..default()
        },
        TextColor(Color::srgba(0.0, 1.0, 0.0, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        },
        EventLogNode,
    ));

    // Recovery prompt, shown only while the session has failed
    commands.spawn((
        Text::new(""),
        TextColor(Color::srgb(1.0, 0.4, 0.4)),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
        Visibility::Hidden,
        RecoveryPromptNode,
    ));
}

// ============================================================================
// Gestures
// ============================================================================

fn place_message(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut selection: ResMut<Selection>,
    camera_query: Query<&GlobalTransform, With<PanOrbitCamera>>,
) {
    if selection.editing || !keyboard.just_pressed(KeyCode::Space) {
        return;
    }

    let Ok(camera) = camera_query.single() else {
        return;
    };

    selection.placed += 1;
    let position = camera.translation() + camera.forward() * PLACE_DISTANCE;
    commands.trigger(PlaceMessage::new(
        Transform::from_translation(position),
        format!("Note {}", selection.placed),
    ));
}

fn cycle_selection(
    keyboard: Res<ButtonInput<KeyCode>>,
    collection: Res<MessageCollection>,
    mut selection: ResMut<Selection>,
) {
    if selection.editing || selection.dragging || !keyboard.just_pressed(KeyCode::Tab) {
        return;
    }

    let ids: Vec<MessageId> = collection.handles().map(|handle| handle.id).collect();
    let next = match selection.message.and_then(|id| ids.iter().position(|&i| i == id)) {
        Some(index) => ids.get(index + 1).or_else(|| ids.first()),
        None => ids.first(),
    };
    selection.message = next.copied();

    if let Some(id) = selection.message {
        info!("Selected {id}");
    }
}

fn toggle_drag(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut selection: ResMut<Selection>,
) {
    if selection.editing || !keyboard.just_pressed(KeyCode::KeyG) {
        return;
    }

    let Some(message) = selection.message else {
        return;
    };

    if selection.dragging {
        commands.trigger(EndDrag { message });
    } else {
        commands.trigger(BeginDrag { message });
    }
    selection.dragging = !selection.dragging;
}

fn toggle_edit(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    collection: Res<MessageCollection>,
    messages: Query<&AnchoredMessage>,
    mut selection: ResMut<Selection>,
) {
    if !keyboard.just_pressed(KeyCode::Enter) {
        return;
    }

    let Some(message) = selection.message else {
        return;
    };

    if selection.editing {
        commands.trigger(EndEdit { message });
        selection.editing = false;
        return;
    }

    let Some(current) = collection
        .entity(message)
        .and_then(|entity| messages.get(entity).ok())
    else {
        return;
    };

    selection.draft = current.text().to_string();
    selection.editing = true;
    commands.trigger(BeginEdit { message });
}

fn type_into_message(
    mut commands: Commands,
    mut keys: MessageReader<KeyboardInput>,
    mut selection: ResMut<Selection>,
) {
    if !selection.editing {
        keys.clear();
        return;
    }

    let Some(message) = selection.message else {
        return;
    };

    let mut changed = false;
    for key in keys.read() {
        if key.state != ButtonState::Pressed {
            continue;
        }
        match &key.logical_key {
            Key::Character(characters) => {
                selection.draft.push_str(characters.as_str());
                changed = true;
            },
            Key::Space => {
                selection.draft.push(' ');
                changed = true;
            },
            Key::Backspace => {
                selection.draft.pop();
                changed = true;
            },
            _ => {},
        }
    }

    if changed {
        commands.trigger(CommitEdit {
            message,
            text: selection.draft.clone(),
        });
    }
}

fn move_selected(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    selection: Res<Selection>,
    collection: Res<MessageCollection>,
    transforms: Query<&Transform, With<AnchoredMessage>>,
) {
    if selection.editing {
        return;
    }

    let Some(message) = selection.message else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        direction.y -= 1.0;
    }
    if direction == Vec3::ZERO {
        return;
    }

    let Some(current) = collection
        .entity(message)
        .and_then(|entity| transforms.get(entity).ok())
    else {
        return;
    };

    let transform = current.with_translation(
        current.translation + direction * MOVE_SPEED * time.delta_secs(),
    );

    if selection.dragging {
        commands.trigger(UpdateDrag { message, transform });
    } else {
        commands.trigger(MoveMessage { message, transform });
    }
}

fn delete_selected(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut selection: ResMut<Selection>,
) {
    if selection.editing || !keyboard.just_pressed(KeyCode::Delete) {
        return;
    }

    if let Some(message) = selection.message.take() {
        commands.trigger(DeleteMessage { message });
        selection.dragging = false;
    }
}

fn clear_messages(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut selection: ResMut<Selection>,
) {
    if selection.editing || !keyboard.just_pressed(KeyCode::KeyC) {
        return;
    }

    commands.trigger(ClearMessages);
    selection.message = None;
    selection.dragging = false;
}

// ============================================================================
// Failure and recovery
// ============================================================================

fn simulate_failure(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    selection: Res<Selection>,
) {
    if selection.editing || !keyboard.just_pressed(KeyCode::KeyF) {
        return;
    }

    commands.trigger(TrackingFailed(
        TrackingError::new("Camera input is unavailable.")
            .with_failure_reason("The simulated sensor stopped delivering frames.")
            .with_recovery_suggestion("Restart the session to continue."),
    ));
}

fn confirm_recovery(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    status: Res<SessionStatus>,
    mut selection: ResMut<Selection>,
) {
    if !status.is_awaiting_confirmation() || !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }

    // Recovery clears every message
    let placed = selection.placed;
    *selection = Selection {
        placed,
        ..default()
    };
    commands.trigger(ConfirmRecovery);
}

fn show_recovery_prompt(
    prompt: On<RecoveryRequested>,
    mut query: Query<(&mut Text, &mut Visibility), With<RecoveryPromptNode>>,
) {
    for (mut text, mut visibility) in &mut query {
        **text = format!(
            "{}\n{}\n\nPress 'R' to {}",
            prompt.title, prompt.diagnostic, prompt.action_label
        );
        *visibility = Visibility::Inherited;
    }
}

fn hide_recovery_prompt(
    _recovered: On<SessionRecovered>,
    time: Res<Time>,
    mut log: ResMut<EventLog>,
    mut query: Query<&mut Visibility, With<RecoveryPromptNode>>,
) {
    for mut visibility in &mut query {
        *visibility = Visibility::Hidden;
    }
    log.push("SessionRecovered".to_string(), &time);
}

// ============================================================================
// Event log
// ============================================================================

impl EventLog {
    fn push(&mut self, text: String, time: &Time) {
        self.lines.push(EventLine {
            text,
            timestamp: time.elapsed_secs(),
        });
        self.dirty = true;
    }
}

fn log_message_placed(event: On<MessagePlaced>, time: Res<Time>, mut log: ResMut<EventLog>) {
    log.push(format!("MessagePlaced {}", event.message), &time);
}

fn log_message_removed(event: On<MessageRemoved>, time: Res<Time>, mut log: ResMut<EventLog>) {
    log.push(
        format!("MessageRemoved {} ({})", event.message, event.anchor),
        &time,
    );
}

fn log_session_restarted(
    event: On<SessionRestarted>,
    time: Res<Time>,
    mut log: ResMut<EventLog>,
) {
    log.push(
        format!("SessionRestarted\n  cleared_anchors={}", event.cleared_anchors),
        &time,
    );
}

fn update_event_log_text(
    time: Res<Time>,
    mut log: ResMut<EventLog>,
    mut query: Query<&mut Text, With<EventLogNode>>,
) {
    let now = time.elapsed_secs();
    let prev_len = log.lines.len();
    log.lines
        .retain(|line| now - line.timestamp < EVENT_LINE_LIFETIME_SECS);
    let expired = log.lines.len() != prev_len;

    if !log.dirty && !expired {
        return;
    }
    log.dirty = false;

    let display: String = log
        .lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    for mut text in &mut query {
        **text = display.clone();
    }
}
