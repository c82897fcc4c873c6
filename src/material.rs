/// Roughness/metalness applied when a loaded model's materials are rebound
/// to a consistent response.
pub const MODEL_ROUGHNESS: f32 = 0.5;
pub const MODEL_METALNESS: f32 = 0.5;

/// A decoded RGBA8 image ready for GPU upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// The texture channels a standard material understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    Color,
    Roughness,
    Normal,
}

impl TextureChannel {
    pub fn name(&self) -> &'static str {
        match self {
            TextureChannel::Color => "color",
            TextureChannel::Roughness => "roughness",
            TextureChannel::Normal => "normal",
        }
    }
}

/// Optional decoded maps, populated asynchronously as each image arrives.
#[derive(Debug, Clone, Default)]
pub struct TextureMaps {
    pub color: Option<TextureImage>,
    pub roughness: Option<TextureImage>,
    pub normal: Option<TextureImage>,
}

impl TextureMaps {
    pub fn set(&mut self, channel: TextureChannel, image: TextureImage) {
        match channel {
            TextureChannel::Color => self.color = Some(image),
            TextureChannel::Roughness => self.roughness = Some(image),
            TextureChannel::Normal => self.normal = Some(image),
        }
    }

    pub fn get(&self, channel: TextureChannel) -> Option<&TextureImage> {
        match channel {
            TextureChannel::Color => self.color.as_ref(),
            TextureChannel::Roughness => self.roughness.as_ref(),
            TextureChannel::Normal => self.normal.as_ref(),
        }
    }
}

/// Surface description for a scene object.
///
/// `Standard` responds to lighting with a metalness/roughness model and may
/// carry texture maps; `Wireframe` draws edges in a flat color and bypasses
/// lighting entirely.
#[derive(Debug, Clone)]
pub enum Material {
    Standard {
        base_color: [f32; 3],
        metalness: f32,
        roughness: f32,
        maps: TextureMaps,
    },
    Wireframe {
        color: [f32; 3],
    },
}

impl Material {
    pub fn standard(base_color: [f32; 3]) -> Self {
        Material::Standard {
            base_color,
            metalness: 0.0,
            roughness: 1.0,
            maps: TextureMaps::default(),
        }
    }

    pub fn wireframe(color: [f32; 3]) -> Self {
        Material::Wireframe { color }
    }

    pub fn is_wireframe(&self) -> bool {
        matches!(self, Material::Wireframe { .. })
    }

    pub fn color(&self) -> [f32; 3] {
        match self {
            Material::Standard { base_color, .. } => *base_color,
            Material::Wireframe { color } => *color,
        }
    }

    pub fn color_mut(&mut self) -> &mut [f32; 3] {
        match self {
            Material::Standard { base_color, .. } => base_color,
            Material::Wireframe { color } => color,
        }
    }

    pub fn metalness(&self) -> Option<f32> {
        match self {
            Material::Standard { metalness, .. } => Some(*metalness),
            Material::Wireframe { .. } => None,
        }
    }

    pub fn roughness(&self) -> Option<f32> {
        match self {
            Material::Standard { roughness, .. } => Some(*roughness),
            Material::Wireframe { .. } => None,
        }
    }

    pub fn set_metalness(&mut self, value: f32) {
        if let Material::Standard { metalness, .. } = self {
            *metalness = value;
        }
    }

    pub fn set_roughness(&mut self, value: f32) {
        if let Material::Standard { roughness, .. } = self {
            *roughness = value;
        }
    }

    pub fn maps_mut(&mut self) -> Option<&mut TextureMaps> {
        match self {
            Material::Standard { maps, .. } => Some(maps),
            Material::Wireframe { .. } => None,
        }
    }

    pub fn maps(&self) -> Option<&TextureMaps> {
        match self {
            Material::Standard { maps, .. } => Some(maps),
            Material::Wireframe { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_material_defaults() {
        let mat = Material::standard([1.0, 1.0, 1.0]);
        assert_eq!(mat.metalness(), Some(0.0));
        assert_eq!(mat.roughness(), Some(1.0));
        assert!(!mat.is_wireframe());
    }

    #[test]
    fn wireframe_has_no_lighting_response() {
        let mut mat = Material::wireframe([1.0, 0.0, 0.0]);
        assert!(mat.is_wireframe());
        assert_eq!(mat.metalness(), None);
        assert_eq!(mat.roughness(), None);
        assert!(mat.maps_mut().is_none());

        // Setting a response on a wireframe is a no-op, not a fault.
        mat.set_metalness(0.8);
        assert_eq!(mat.metalness(), None);
    }

    #[test]
    fn maps_populate_per_channel() {
        let mut mat = Material::standard([0.5, 0.5, 0.5]);
        let img = TextureImage {
            width: 2,
            height: 2,
            pixels: vec![0; 16],
        };

        let maps = mat.maps_mut().unwrap();
        maps.set(TextureChannel::Roughness, img);

        let maps = mat.maps().unwrap();
        assert!(maps.get(TextureChannel::Roughness).is_some());
        assert!(maps.get(TextureChannel::Color).is_none());
        assert!(maps.get(TextureChannel::Normal).is_none());
    }

    #[test]
    fn color_is_mutable_in_place() {
        let mut mat = Material::standard([0.1, 0.2, 0.3]);
        mat.color_mut()[0] = 0.9;
        assert_eq!(mat.color(), [0.9, 0.2, 0.3]);
    }
}
