use glam::Vec3;

/// Soft beige used by the primitive rig ("#F5F5DC").
pub const BEIGE: [f32; 3] = [0.961, 0.961, 0.863];
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const RED: [f32; 3] = [1.0, 0.0, 0.0];

/// What a spot light points at. A weak relation: the scene owns the object,
/// the light only names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTarget {
    /// Index of a `SceneObject` in the owning scene.
    Object(usize),
    Origin,
}

/// A light source. All variants carry intensity and color; everything but
/// ambient has a position in world space.
#[derive(Debug, Clone)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
    },
    Point {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        /// Falloff distance; 0 means no falloff.
        distance: f32,
    },
    Spot {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        target: LightTarget,
    },
}

impl Light {
    pub fn ambient(color: [f32; 3], intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(color: [f32; 3], intensity: f32, position: Vec3) -> Self {
        Light::Directional {
            color,
            intensity,
            position,
        }
    }

    pub fn point(color: [f32; 3], intensity: f32, position: Vec3, distance: f32) -> Self {
        Light::Point {
            color,
            intensity,
            position,
            distance,
        }
    }

    pub fn spot(color: [f32; 3], intensity: f32, position: Vec3, target: LightTarget) -> Self {
        Light::Spot {
            color,
            intensity,
            position,
            target,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Light::Ambient { .. } => "ambient",
            Light::Directional { .. } => "directional",
            Light::Point { .. } => "point",
            Light::Spot { .. } => "spot",
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => *intensity,
        }
    }

    pub fn intensity_mut(&mut self) -> &mut f32 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => intensity,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        match self {
            Light::Ambient { color, .. }
            | Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. } => *color,
        }
    }

    pub fn color_mut(&mut self) -> &mut [f32; 3] {
        match self {
            Light::Ambient { color, .. }
            | Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. } => color,
        }
    }

    /// Position, if this light has one (ambient does not).
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { position, .. }
            | Light::Point { position, .. }
            | Light::Spot { position, .. } => Some(*position),
        }
    }

    pub fn position_mut(&mut self) -> Option<&mut Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { position, .. }
            | Light::Point { position, .. }
            | Light::Spot { position, .. } => Some(position),
        }
    }

    pub fn target(&self) -> Option<LightTarget> {
        match self {
            Light::Spot { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_has_no_position() {
        let mut light = Light::ambient(WHITE, 0.5);
        assert!(light.position().is_none());
        assert!(light.position_mut().is_none());
        assert_eq!(light.kind_name(), "ambient");
    }

    #[test]
    fn intensity_is_mutable_in_place() {
        let mut light = Light::directional(BEIGE, 1.0, Vec3::new(1.9, 3.8, 2.4));
        *light.intensity_mut() = 1.7;
        assert_eq!(light.intensity(), 1.7);
    }

    #[test]
    fn spot_carries_a_weak_target() {
        let light = Light::spot(BEIGE, 1.0, Vec3::new(15.0, 5.0, 45.0), LightTarget::Object(0));
        assert_eq!(light.target(), Some(LightTarget::Object(0)));

        let plain = Light::point(RED, 1.0, Vec3::ZERO, 100.0);
        assert_eq!(plain.target(), None);
    }

    #[test]
    fn position_is_mutable_where_it_exists() {
        let mut light = Light::point(RED, 1.0, Vec3::new(0.1, -0.3, 0.0), 100.0);
        if let Some(pos) = light.position_mut() {
            pos.y = 2.0;
        }
        assert_eq!(light.position().unwrap().y, 2.0);
    }
}
