use bevy::prelude::*;

use super::components::{HudRoot, HudText, LoadingOverlay};
use super::resources::ViewerRes;

pub fn spawn_hud(mut commands: Commands, viewer: Option<Res<ViewerRes>>) {
    let accent: Color = viewer
        .map(|v| v.0.config().scene.accent)
        .unwrap_or(crate::core::Color::SCOPE_GREEN)
        .into();

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(14.0),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("TRACKS 00"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(accent),
                HudText,
            ));
        });

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            LoadingOverlay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Initializing radar..."),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(accent.with_alpha(0.8)),
            ));
        });
}

pub fn update_hud(viewer: Res<ViewerRes>, mut texts: Query<&mut Text, With<HudText>>) {
    let state = &viewer.0;
    let label = format!(
        "TRACKS {:02}{}",
        state.live_count(),
        if state.is_paused() { "  PAUSED" } else { "" }
    );
    for mut text in texts.iter_mut() {
        if text.0 != label {
            text.0 = label.clone();
        }
    }
}

/// Drop the loading overlay once a running frame has been presented, or once
/// mounting gave up.
pub fn clear_loading(
    mut commands: Commands,
    mut viewer: ResMut<ViewerRes>,
    overlays: Query<Entity, With<LoadingOverlay>>,
    mut drawn_once: Local<bool>,
) {
    if viewer.0.is_running() {
        // The first running frame is drawn after this Update, so it counts as
        // presented on the next one.
        if *drawn_once {
            viewer.0.first_frame_rendered();
        } else {
            *drawn_once = true;
        }
    }
    if viewer.0.lifecycle().is_loading() {
        return;
    }
    for entity in overlays.iter() {
        commands.entity(entity).despawn();
    }
}
