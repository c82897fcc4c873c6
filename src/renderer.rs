use crate::error::RenderError;
use crate::material::{TextureChannel, TextureImage};
use crate::panel::ParameterPanel;
use crate::render_loop::FrameStats;
use crate::scene::{Geometry, Scene};

/// Renderer seam for a mounted scene.
///
/// GPU-resident resources (mesh buffers, textures, uniform state) are
/// created only through `upload_scene`/`attach_object`/`apply_texture` and
/// released only through `dispose`; `resource_count` exposes the live total
/// so lifecycle tests can assert leak-freedom.
pub trait SceneRenderer {
    /// Create GPU resources for every object currently in the scene.
    fn upload_scene(&mut self, scene: &Scene) -> Result<(), RenderError>;

    /// Create GPU resources for one object added after the initial upload
    /// (an asynchronously loaded model).
    fn attach_object(&mut self, scene: &Scene, object: usize) -> Result<(), RenderError>;

    /// Upload a decoded texture for one channel of an object's material.
    fn apply_texture(&mut self, object: usize, channel: TextureChannel, image: &TextureImage);

    /// Draw the scene through its camera, plus the parameter panel UI.
    /// The scene is mutable because panel interactions write through to it
    /// within the same frame.
    fn render(
        &mut self,
        scene: &mut Scene,
        panel: &mut ParameterPanel,
        stats: &FrameStats,
    ) -> Result<(), RenderError>;

    /// Resize the output surface to new pixel dimensions.
    fn resize(&mut self, width: u32, height: u32);

    /// Current surface size in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Number of live GPU-resident resources owned by the mounted scene.
    fn resource_count(&self) -> usize;

    /// Release every scene-owned GPU resource. Idempotent.
    fn dispose(&mut self);
}

/// Call-counting renderer double for the test suites. Resource accounting
/// mirrors the real renderer: buffers per mesh, one texture per applied
/// channel, shared scene uniforms.
#[derive(Debug, Default)]
pub struct MockRenderer {
    size: (u32, u32),
    resources: usize,
    frames: usize,
    events: Vec<String>,
}

/// Shared uniform/helper allocations made once per scene upload.
const SCENE_SHARED_RESOURCES: usize = 3;
/// Vertex, index and uniform buffer per mesh.
const RESOURCES_PER_MESH: usize = 3;

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            size: (800, 600),
            ..Default::default()
        }
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }

    /// Ordered log of renderer calls, for sequencing assertions.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    fn mesh_count(scene: &Scene, object: usize) -> usize {
        match scene.objects.get(object).map(|o| &o.geometry) {
            Some(Geometry::Primitive { .. }) => 1,
            Some(Geometry::Model { meshes }) => meshes.len(),
            None => 0,
        }
    }
}

impl SceneRenderer for MockRenderer {
    fn upload_scene(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.resources += SCENE_SHARED_RESOURCES;
        for index in 0..scene.objects.len() {
            self.resources += Self::mesh_count(scene, index) * RESOURCES_PER_MESH;
        }
        self.events.push(format!("upload:{}", scene.objects.len()));
        Ok(())
    }

    fn attach_object(&mut self, scene: &Scene, object: usize) -> Result<(), RenderError> {
        self.resources += Self::mesh_count(scene, object) * RESOURCES_PER_MESH;
        self.events.push(format!("attach:{}", object));
        Ok(())
    }

    fn apply_texture(&mut self, object: usize, channel: TextureChannel, _image: &TextureImage) {
        self.resources += 1;
        self.events
            .push(format!("texture:{}:{}", object, channel.name()));
    }

    fn render(
        &mut self,
        _scene: &mut Scene,
        _panel: &mut ParameterPanel,
        _stats: &FrameStats,
    ) -> Result<(), RenderError> {
        self.frames += 1;
        self.events.push("render".to_string());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.events.push(format!("resize:{}x{}", width, height));
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn resource_count(&self) -> usize {
        self.resources
    }

    fn dispose(&mut self) {
        self.resources = 0;
        self.events.push("dispose".to_string());
    }
}
