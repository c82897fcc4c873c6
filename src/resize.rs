use log::debug;

use crate::camera::PerspectiveCamera;
use crate::renderer::SceneRenderer;

/// Viewport-to-camera and viewport-to-surface synchronization.
///
/// An explicit attach/detach state machine instead of a free listener
/// closure: events delivered while detached are dropped, so an unmounted
/// scene can never be resized. On each size change the render surface is
/// resized first and the camera aspect recomputed second, from the same
/// dimensions, before the next frame renders.
#[derive(Debug)]
pub struct ResizeHandler {
    attached: bool,
    size: (u32, u32),
}

impl ResizeHandler {
    /// Attach at the surface's current size.
    pub fn attach(width: u32, height: u32) -> Self {
        Self {
            attached: true,
            size: (width, height),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last size observed while attached.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Consume a host resize event. Returns whether the event was applied.
    pub fn handle_resize(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        camera: &mut PerspectiveCamera,
        width: u32,
        height: u32,
    ) -> bool {
        if !self.attached || width == 0 || height == 0 {
            return false;
        }

        self.size = (width, height);
        renderer.resize(width, height);
        camera.set_viewport(width, height);
        debug!("viewport resized to {}x{}", width, height);
        true
    }

    /// Stop consuming events. Idempotent.
    pub fn detach(&mut self) {
        self.attached = false;
    }
}
