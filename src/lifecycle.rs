use log::{error, info, warn};

use crate::config::ViewerConfig;
use crate::error::{MountError, RenderError};
use crate::loaders::{ModelLoader, TextureSetLoader};
use crate::panel::ParameterPanel;
use crate::render_loop::RenderLoop;
use crate::renderer::SceneRenderer;
use crate::resize::ResizeHandler;
use crate::scene::{Scene, SceneKind, SceneObject};
use crate::scenes;

/// Resolves a mount target name to a container surface. The binary
/// registers its window here; tests register arbitrary names.
pub trait ContainerProvider {
    fn resolve(&self, name: &str) -> Option<ContainerHandle>;
}

/// Opaque token proving a container name resolved at mount time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Name-keyed container registry.
#[derive(Debug, Default)]
pub struct StaticContainers {
    names: Vec<String>,
}

impl StaticContainers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }
}

impl ContainerProvider for StaticContainers {
    fn resolve(&self, name: &str) -> Option<ContainerHandle> {
        self.names
            .iter()
            .find(|n| n.as_str() == name)
            .map(|n| ContainerHandle(n.clone()))
    }
}

/// One mounted viewing session and its per-scene machinery.
pub struct MountedScene {
    pub kind: SceneKind,
    pub scene: Scene,
    pub panel: ParameterPanel,
    pub render_loop: RenderLoop,
    pub resize_handler: ResizeHandler,
    container: ContainerHandle,
    textures: Option<TextureSetLoader>,
    model: Option<ModelLoader>,
}

impl MountedScene {
    pub fn container_name(&self) -> &str {
        self.container.name()
    }

    /// True while an asynchronous texture or model load is outstanding.
    pub fn has_pending_loads(&self) -> bool {
        self.textures.is_some() || self.model.is_some()
    }
}

/// Owns the process-wide single mounted scene and drives its lifecycle:
/// container resolution, construction, async completions, per-frame
/// stepping, and ordered teardown.
///
/// The mount generation is the disposal guard for async work: completions
/// spawned under an older generation are discarded without touching state.
pub struct SceneLifecycleManager {
    mounted: Option<MountedScene>,
    generation: u64,
}

impl SceneLifecycleManager {
    pub fn new() -> Self {
        Self {
            mounted: None,
            generation: 0,
        }
    }

    pub fn mounted(&self) -> Option<&MountedScene> {
        self.mounted.as_ref()
    }

    pub fn mounted_mut(&mut self) -> Option<&mut MountedScene> {
        self.mounted.as_mut()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mount a scene of `kind` into the named container. Any previously
    /// mounted scene is fully unmounted first; on `MountError::NoContainer`
    /// nothing is constructed and nothing is attached.
    pub fn mount(
        &mut self,
        containers: &dyn ContainerProvider,
        container: &str,
        kind: SceneKind,
        config: &ViewerConfig,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<(), MountError> {
        let Some(handle) = containers.resolve(container) else {
            warn!("mount target `{}` not found, skipping mount", container);
            return Err(MountError::NoContainer(container.to_string()));
        };

        // The previous scene's teardown completes before any construction.
        self.unmount(renderer);
        self.generation += 1;

        let (width, height) = renderer.surface_size();
        let built = scenes::build(kind, config, width, height);

        renderer.upload_scene(&built.scene)?;

        let textures = built
            .texture_paths
            .as_ref()
            .map(|paths| TextureSetLoader::spawn(paths, self.generation));
        let model = built
            .model_path
            .clone()
            .map(|path| ModelLoader::spawn(path, self.generation));

        let resize_handler = ResizeHandler::attach(width, height);
        let mut render_loop = RenderLoop::new();
        render_loop.start();

        info!(
            "mounted `{}` scene into `{}` ({} objects, {} lights)",
            kind.name(),
            container,
            built.scene.objects.len(),
            built.scene.lights.len()
        );

        self.mounted = Some(MountedScene {
            kind,
            scene: built.scene,
            panel: built.panel,
            render_loop,
            resize_handler,
            container: handle,
            textures,
            model,
        });

        Ok(())
    }

    /// Tear down the mounted scene, in order: stop the render loop, detach
    /// the resize listener, destroy the panel, release GPU resources,
    /// release the container. Unmounting when nothing is mounted is a
    /// no-op.
    pub fn unmount(&mut self, renderer: &mut dyn SceneRenderer) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };

        mounted.render_loop.stop();
        mounted.resize_handler.detach();
        mounted.panel.destroy();
        renderer.dispose();
        // Dropping `mounted` releases the container handle and closes the
        // channels of any in-flight loader.
        self.generation += 1;

        info!("unmounted `{}` scene", mounted.kind.name());
    }

    /// Drive one host frame: consume async completions at the frame
    /// boundary, then step the render loop.
    pub fn frame(&mut self, renderer: &mut dyn SceneRenderer) -> Result<(), RenderError> {
        self.poll_textures(renderer);
        self.poll_model(renderer)?;

        let Some(mounted) = &mut self.mounted else {
            return Ok(());
        };
        mounted
            .render_loop
            .frame(&mut mounted.scene, &mut mounted.panel, renderer)
    }

    /// Forward a host resize event to the mounted scene's handler.
    pub fn handle_resize(&mut self, renderer: &mut dyn SceneRenderer, width: u32, height: u32) {
        if let Some(mounted) = &mut self.mounted {
            mounted
                .resize_handler
                .handle_resize(renderer, &mut mounted.scene.camera, width, height);
        }
    }

    /// Forward an orbit drag to the mounted scene's controls.
    pub fn pointer_rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if let Some(mounted) = &mut self.mounted {
            mounted.scene.controls.rotate(delta_yaw, delta_pitch);
        }
    }

    /// Forward a scroll step to the mounted scene's controls.
    pub fn pointer_zoom(&mut self, steps: f32) {
        if let Some(mounted) = &mut self.mounted {
            mounted.scene.controls.zoom(steps);
        }
    }

    fn poll_textures(&mut self, renderer: &mut dyn SceneRenderer) {
        let generation = self.generation;
        let Some(mounted) = &mut self.mounted else {
            return;
        };
        let Some(loader) = &mut mounted.textures else {
            return;
        };

        if loader.generation() != generation {
            // Spawned under an earlier mount; discard wholesale.
            mounted.textures = None;
            return;
        }

        for (channel, result) in loader.poll() {
            match result {
                Ok(image) => {
                    let object = 0;
                    if let Some(obj) = mounted.scene.objects.get_mut(object) {
                        obj.for_each_material(|m| {
                            if let Some(maps) = m.maps_mut() {
                                maps.set(channel, image.clone());
                            }
                        });
                    }
                    renderer.apply_texture(object, channel, &image);
                    info!("applied {} map", channel.name());
                }
                Err(e) => {
                    // The mesh keeps its default for this channel; the
                    // remaining channels continue loading.
                    warn!("{}", e);
                }
            }
        }

        if loader.finished() {
            mounted.textures = None;
        }
    }

    fn poll_model(&mut self, renderer: &mut dyn SceneRenderer) -> Result<(), RenderError> {
        let generation = self.generation;
        let Some(mounted) = &mut self.mounted else {
            return Ok(());
        };
        let Some(loader) = &mounted.model else {
            return Ok(());
        };

        let Some(result) = loader.poll() else {
            return Ok(());
        };
        let loader_generation = loader.generation();
        mounted.model = None;

        if loader_generation != generation {
            info!("discarding model load completed after unmount");
            return Ok(());
        }

        match result {
            Ok(mut model) => {
                let center = model.normalize();
                model.rebind_materials();
                info!(
                    "model ready: {} meshes, original center {:?}",
                    model.meshes.len(),
                    center
                );

                let index = mounted.scene.objects.len();
                mounted.scene.objects.push(SceneObject::model(model.meshes));
                // The normalized model is centered at the origin; aim the
                // orbit there.
                mounted.scene.controls.set_target(glam::Vec3::ZERO);
                renderer.attach_object(&mounted.scene, index)?;
            }
            Err(e) => {
                // The scene stays valid without the model.
                error!("{}", e);
            }
        }

        Ok(())
    }
}

impl Default for SceneLifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for assertions: whether every per-scene resource is
/// released.
pub fn is_torn_down(manager: &SceneLifecycleManager, renderer: &dyn SceneRenderer) -> bool {
    manager.mounted().is_none() && renderer.resource_count() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_loop::LoopState;
    use crate::renderer::MockRenderer;

    fn containers() -> StaticContainers {
        let mut c = StaticContainers::new();
        c.register("viewport");
        c
    }

    #[test]
    fn mount_into_missing_container_is_a_silent_no_op() {
        let containers = StaticContainers::new();
        let mut renderer = MockRenderer::new();
        let mut manager = SceneLifecycleManager::new();

        let result = manager.mount(
            &containers,
            "viewport",
            SceneKind::Sphere,
            &ViewerConfig::default(),
            &mut renderer,
        );

        assert!(matches!(result, Err(MountError::NoContainer(_))));
        assert!(manager.mounted().is_none());
        assert_eq!(renderer.resource_count(), 0);
        assert!(renderer.events().is_empty());
    }

    #[test]
    fn mount_starts_loop_and_attaches_resize() {
        let containers = containers();
        let mut renderer = MockRenderer::new();
        let mut manager = SceneLifecycleManager::new();

        manager
            .mount(
                &containers,
                "viewport",
                SceneKind::Sphere,
                &ViewerConfig::default(),
                &mut renderer,
            )
            .unwrap();

        let mounted = manager.mounted().unwrap();
        assert_eq!(mounted.render_loop.state(), LoopState::Running);
        assert!(mounted.resize_handler.is_attached());
        assert_eq!(mounted.container_name(), "viewport");
        assert!(renderer.resource_count() > 0);
    }

    #[test]
    fn unmount_is_ordered_and_idempotent() {
        let containers = containers();
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
        manager.unmount(&mut renderer);

        assert!(is_torn_down(&manager, &renderer));
        assert_eq!(renderer.events().last().map(String::as_str), Some("dispose"));

        // Unmounting again does nothing.
        let events_before = renderer.events().len();
        manager.unmount(&mut renderer);
        assert_eq!(renderer.events().len(), events_before);
    }

    #[test]
    fn remount_releases_before_reallocating() {
        let containers = containers();
        let mut renderer = MockRenderer::new();
        let mut manager = SceneLifecycleManager::new();

        manager
            .mount(
                &containers,
                "viewport",
                SceneKind::Sphere,
                &ViewerConfig::default(),
                &mut renderer,
            )
            .unwrap();
        manager
            .mount(
                &containers,
                "viewport",
                SceneKind::Cylinder,
                &ViewerConfig::default(),
                &mut renderer,
            )
            .unwrap();

        let events = renderer.events();
        let dispose_at = events.iter().position(|e| e == "dispose").unwrap();
        let second_upload_at = events.iter().rposition(|e| e.starts_with("upload")).unwrap();
        assert!(
            dispose_at < second_upload_at,
            "previous scene must be released before the next allocates: {:?}",
            events
        );
        assert_eq!(manager.mounted().unwrap().kind, SceneKind::Cylinder);
    }
}
