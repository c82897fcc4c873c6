use glam::Vec3;

use crate::light::{Light, LightTarget, BEIGE, RED, WHITE};

/// One colored line segment of a helper decoration.
#[derive(Debug, Clone, Copy)]
pub struct HelperLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [f32; 3],
}

/// Debug visual aid tracking one light. The line set is rebuilt every frame
/// from the light's current transform, so a binding moving the light moves
/// its helper on the same frame.
#[derive(Debug, Clone)]
pub struct LightHelper {
    /// Index of the decorated light in the owning scene.
    pub light: usize,
    pub lines: Vec<HelperLine>,
}

impl LightHelper {
    pub fn new(light: usize) -> Self {
        Self {
            light,
            lines: Vec::new(),
        }
    }

    /// Rebuild the line set for the light's current state. `target` is the
    /// resolved world position a spot light points at.
    pub fn refresh(&mut self, light: &Light, target: Vec3) {
        self.lines.clear();
        let color = light.color();

        match light {
            Light::Ambient { .. } => {
                // Ambient has no transform; decorate the origin with axes.
                self.lines.push(HelperLine {
                    start: Vec3::ZERO,
                    end: Vec3::X * 5.0,
                    color: [1.0, 0.0, 0.0],
                });
                self.lines.push(HelperLine {
                    start: Vec3::ZERO,
                    end: Vec3::Y * 5.0,
                    color: [0.0, 1.0, 0.0],
                });
                self.lines.push(HelperLine {
                    start: Vec3::ZERO,
                    end: Vec3::Z * 5.0,
                    color: [0.0, 0.0, 1.0],
                });
            }
            Light::Directional { position, .. } => {
                self.lines.push(HelperLine {
                    start: *position,
                    end: Vec3::ZERO,
                    color,
                });
                self.cross_at(*position, 0.5, color);
            }
            Light::Point { position, .. } => {
                self.cross_at(*position, 0.2, color);
            }
            Light::Spot { position, .. } => {
                // Cone outline: four rim lines plus the center ray.
                self.lines.push(HelperLine {
                    start: *position,
                    end: target,
                    color,
                });
                let axis = (target - *position).normalize_or_zero();
                let side = if axis.y.abs() > 0.999 {
                    Vec3::X
                } else {
                    axis.cross(Vec3::Y).normalize_or_zero()
                };
                let up = axis.cross(side).normalize_or_zero();
                let spread = (target - *position).length() * 0.25;
                for rim in [side, -side, up, -up] {
                    self.lines.push(HelperLine {
                        start: *position,
                        end: target + rim * spread,
                        color,
                    });
                }
            }
        }
    }

    fn cross_at(&mut self, center: Vec3, size: f32, color: [f32; 3]) {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            self.lines.push(HelperLine {
                start: center - axis * size,
                end: center + axis * size,
                color,
            });
        }
    }
}

/// The four-light rig used by primitive scenes: ambient fill, one key
/// directional, a spot aimed at the primary object, and a red point light
/// tucked under it. Helpers decorate every light.
pub fn primitive_rig(spot_target: LightTarget) -> (Vec<Light>, Vec<LightHelper>) {
    let lights = vec![
        Light::ambient(BEIGE, 0.5),
        Light::directional(BEIGE, 1.0, Vec3::new(1.9, 3.8, 2.4)),
        Light::spot(BEIGE, 1.0, Vec3::new(15.0, 5.0, 45.0), spot_target),
        Light::point(RED, 1.0, Vec3::new(0.1, -0.3, 0.0), 100.0),
    ];

    let helpers = (0..lights.len()).map(LightHelper::new).collect();

    (lights, helpers)
}

/// The studio rig used by model scenes: ambient plus key, fill and rim
/// directionals. No helper decorations.
pub fn studio_rig() -> Vec<Light> {
    vec![
        Light::ambient(WHITE, 0.5),
        Light::directional(WHITE, 1.0, Vec3::new(5.0, 5.0, 5.0)),
        Light::directional(WHITE, 0.5, Vec3::new(-5.0, 5.0, -5.0)),
        Light::directional(WHITE, 0.2, Vec3::new(0.0, 10.0, 0.0)),
    ]
}
