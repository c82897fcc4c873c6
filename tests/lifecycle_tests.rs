use std::thread;
use std::time::Duration;

use scene_viewer::config::ViewerConfig;
use scene_viewer::lifecycle::{SceneLifecycleManager, StaticContainers};
use scene_viewer::panel::{BindTarget, ControlValue};
use scene_viewer::render_loop::LoopState;
use scene_viewer::renderer::{MockRenderer, SceneRenderer};
use scene_viewer::scene::SceneKind;

const ALL_KINDS: [SceneKind; 5] = [
    SceneKind::Box,
    SceneKind::Sphere,
    SceneKind::Cylinder,
    SceneKind::BoxMaterial,
    SceneKind::Model,
];

fn viewport() -> StaticContainers {
    let mut containers = StaticContainers::new();
    containers.register("viewport");
    containers
}

/// Pump frames until no asynchronous load is outstanding.
fn settle(manager: &mut SceneLifecycleManager, renderer: &mut MockRenderer) {
    for _ in 0..400 {
        manager.frame(renderer).unwrap();
        match manager.mounted() {
            Some(mounted) if mounted.has_pending_loads() => {
                thread::sleep(Duration::from_millis(5));
            }
            _ => return,
        }
    }
    panic!("asynchronous loads did not settle");
}

#[test]
fn every_kind_mounts_and_unmounts_without_leaks() {
    let containers = viewport();

    for kind in ALL_KINDS {
        let mut renderer = MockRenderer::new();
        let mut manager = SceneLifecycleManager::new();

        manager
            .mount(&containers, "viewport", kind, &ViewerConfig::default(), &mut renderer)
            .unwrap();
        assert!(renderer.resource_count() > 0 || kind == SceneKind::Model);

        manager.unmount(&mut renderer);
        assert_eq!(
            renderer.resource_count(),
            0,
            "{:?} leaked GPU resources",
            kind
        );
        assert!(manager.mounted().is_none());
    }
}

#[test]
fn switching_scenes_releases_the_previous_one_first() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    for pair in ALL_KINDS.windows(2) {
        manager
            .mount(&containers, "viewport", pair[0], &ViewerConfig::default(), &mut renderer)
            .unwrap();
        manager
            .mount(&containers, "viewport", pair[1], &ViewerConfig::default(), &mut renderer)
            .unwrap();

        let events = renderer.events();
        let last_dispose = events.iter().rposition(|e| e == "dispose").unwrap();
        let last_upload = events.iter().rposition(|e| e.starts_with("upload")).unwrap();
        assert!(
            last_dispose < last_upload,
            "switch {:?} -> {:?} allocated before releasing: {:?}",
            pair[0],
            pair[1],
            events
        );

        manager.unmount(&mut renderer);
    }
}

#[test]
fn frames_only_run_while_mounted() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    manager.frame(&mut renderer).unwrap();
    assert_eq!(renderer.frames_rendered(), 0);

    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Sphere,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();
    manager.frame(&mut renderer).unwrap();
    manager.frame(&mut renderer).unwrap();
    assert_eq!(renderer.frames_rendered(), 2);
    assert_eq!(
        manager.mounted().unwrap().render_loop.state(),
        LoopState::Running
    );

    manager.unmount(&mut renderer);
    manager.frame(&mut renderer).unwrap();
    assert_eq!(renderer.frames_rendered(), 2);
}

#[test]
fn resize_while_mounted_updates_surface_then_camera() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Cylinder,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();

    manager.handle_resize(&mut renderer, 1920, 1080);
    manager.frame(&mut renderer).unwrap();

    assert_eq!(renderer.surface_size(), (1920, 1080));
    let camera = &manager.mounted().unwrap().scene.camera;
    assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);

    // After unmount the handler is detached; nothing moves.
    manager.unmount(&mut renderer);
    manager.handle_resize(&mut renderer, 640, 480);
    assert_eq!(renderer.surface_size(), (1920, 1080));
}

#[test]
fn binding_effect_lands_without_reconstruction() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::BoxMaterial,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();

    let uploads_before = renderer
        .events()
        .iter()
        .filter(|e| e.starts_with("upload"))
        .count();

    let target = BindTarget::MaterialMetalness { object: 0 };
    {
        let mounted = manager.mounted_mut().unwrap();
        assert!(target.apply(&mut mounted.scene, ControlValue::Scalar(0.42)));
    }

    manager.frame(&mut renderer).unwrap();

    let mounted = manager.mounted().unwrap();
    assert_eq!(
        mounted.scene.objects[0].material().unwrap().metalness(),
        Some(0.42)
    );
    let uploads_after = renderer
        .events()
        .iter()
        .filter(|e| e.starts_with("upload"))
        .count();
    assert_eq!(uploads_before, uploads_after, "scene was reconstructed");
}

#[test]
fn model_load_failure_leaves_the_scene_functional() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    // The default model path does not exist in the test environment.
    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Model,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();

    settle(&mut manager, &mut renderer);

    let mounted = manager.mounted().unwrap();
    assert!(mounted.scene.objects.is_empty());
    assert_eq!(mounted.render_loop.state(), LoopState::Running);
    assert_eq!(mounted.scene.lights.len(), 4);

    // The loop keeps ticking after the failure.
    let frames = renderer.frames_rendered();
    manager.frame(&mut renderer).unwrap();
    assert_eq!(renderer.frames_rendered(), frames + 1);
}

#[test]
fn unmount_during_inflight_model_load_discards_the_completion() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Model,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();
    // Unmount before the loader thread can possibly deliver.
    manager.unmount(&mut renderer);
    assert_eq!(renderer.resource_count(), 0);

    // Mount something else; the stale completion must not touch it.
    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Sphere,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    for _ in 0..10 {
        manager.frame(&mut renderer).unwrap();
    }

    let mounted = manager.mounted().unwrap();
    assert_eq!(mounted.kind, SceneKind::Sphere);
    assert_eq!(mounted.scene.objects.len(), 1);
    assert!(mounted.scene.objects[0].material().unwrap().is_wireframe());
}

#[test]
fn missing_textures_keep_the_box_scene_alive() {
    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();

    // Default texture paths do not exist here; every channel fails.
    manager
        .mount(
            &containers,
            "viewport",
            SceneKind::Box,
            &ViewerConfig::default(),
            &mut renderer,
        )
        .unwrap();

    settle(&mut manager, &mut renderer);

    let mounted = manager.mounted().unwrap();
    let material = mounted.scene.objects[0].material().unwrap();
    let maps = material.maps().unwrap();
    assert!(maps.color.is_none());
    assert!(maps.roughness.is_none());
    assert!(maps.normal.is_none());
    assert!(!renderer.events().iter().any(|e| e.starts_with("texture")));
    assert_eq!(mounted.render_loop.state(), LoopState::Running);
}

#[test]
fn partial_texture_failure_applies_the_other_channels() {
    let dir = std::env::temp_dir().join("scene_viewer_lifecycle_textures");
    std::fs::create_dir_all(&dir).unwrap();
    let color = dir.join("color.png");
    let roughness = dir.join("roughness.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 180, 160, 255]))
        .save(&color)
        .unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([90, 90, 90, 255]))
        .save(&roughness)
        .unwrap();

    let mut config = ViewerConfig::default();
    config.texture.color = color;
    config.texture.roughness = roughness;
    config.texture.normal = dir.join("missing_normal.png");

    let containers = viewport();
    let mut renderer = MockRenderer::new();
    let mut manager = SceneLifecycleManager::new();
    manager
        .mount(&containers, "viewport", SceneKind::Box, &config, &mut renderer)
        .unwrap();

    settle(&mut manager, &mut renderer);

    let mounted = manager.mounted().unwrap();
    let material = mounted.scene.objects[0].material().unwrap();
    let maps = material.maps().unwrap();
    assert!(maps.color.is_some());
    assert!(maps.roughness.is_some());
    assert!(maps.normal.is_none());

    let textures: Vec<_> = renderer
        .events()
        .iter()
        .filter(|e| e.starts_with("texture"))
        .cloned()
        .collect();
    assert_eq!(textures.len(), 2);
    assert!(textures.contains(&"texture:0:color".to_string()));
    assert!(textures.contains(&"texture:0:roughness".to_string()));
}
