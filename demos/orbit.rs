//! A minimal example showing the steps needed to get started with the plugin.

use bevy::{math::DVec3, prelude::*};
use bevy_focus_cam::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultCameraControlsPlugins, // Step 1: Add camera controller plugins
        ))
        .add_systems(Startup, (setup_camera, setup_scene))
        .add_systems(Update, reset_on_space)
        .run();
}

fn setup_camera(mut commands: Commands) {
    let position = Vec3::new(0.0, 3.0, 10.0);
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        // Step 2: add camera controls to any camera
        CameraControls::new(position.as_dvec3(), WindowSurface::default()),
    ));
}

fn reset_on_space(keys: Res<ButtonInput<KeyCode>>, mut controls: Query<&mut CameraControls>) {
    if keys.just_pressed(KeyCode::Space) {
        for mut controls in &mut controls {
            controls.reset(true);
        }
    }
    if keys.just_pressed(KeyCode::KeyF) {
        for mut controls in &mut controls {
            controls.move_to(DVec3::new(2.0, 0.5, 0.0), true);
        }
    }
}

//
// --- The below code is not important for the example ---
//

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = materials.add(Color::srgb(0.3, 0.5, 0.3));
    let block = materials.add(Color::srgb(0.8, 0.7, 0.6));
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(ground),
    ));
    for i in -2i32..=2 {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0 + i.abs() as f32, 1.0))),
            MeshMaterial3d(block.clone()),
            Transform::from_xyz(2.0 * i as f32, 0.5, 0.0),
        ));
    }
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let text = "
        Left Mouse - Orbit (Shift: look around)
        Right Mouse - Pan
        Scroll - Zoom to cursor
        WASD / Arrows - Move and look
        Space - Reset, F - Focus the right block
    ";
    info!("{text}");
}
