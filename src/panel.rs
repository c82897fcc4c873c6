use std::ops::RangeInclusive;

use crate::scene::Scene;

/// Component selector for vector-valued properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// A typed (object reference, property) pair. Bindings address live scene
/// state by index and property enum; a target that no longer resolves (for
/// example a model that has not finished loading) simply reads as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget {
    ObjectRotation { object: usize, axis: Axis },
    MaterialMetalness { object: usize },
    MaterialRoughness { object: usize },
    MaterialColor { object: usize },
    LightIntensity { light: usize },
    LightColor { light: usize },
    LightPosition { light: usize, axis: Axis },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Scalar(f32),
    Color([f32; 3]),
}

impl BindTarget {
    /// Current value of the bound property, or `None` while the target does
    /// not resolve.
    pub fn read(&self, scene: &Scene) -> Option<ControlValue> {
        match *self {
            BindTarget::ObjectRotation { object, axis } => {
                let obj = scene.objects.get(object)?;
                Some(ControlValue::Scalar(obj.transform.rotation[axis.index()]))
            }
            BindTarget::MaterialMetalness { object } => {
                let obj = scene.objects.get(object)?;
                let mut value = None;
                match &obj.geometry {
                    crate::scene::Geometry::Primitive { material, .. } => {
                        value = material.metalness();
                    }
                    crate::scene::Geometry::Model { meshes } => {
                        if let Some(first) = meshes.first() {
                            value = first.material.metalness();
                        }
                    }
                }
                value.map(ControlValue::Scalar)
            }
            BindTarget::MaterialRoughness { object } => {
                let obj = scene.objects.get(object)?;
                let mut value = None;
                match &obj.geometry {
                    crate::scene::Geometry::Primitive { material, .. } => {
                        value = material.roughness();
                    }
                    crate::scene::Geometry::Model { meshes } => {
                        if let Some(first) = meshes.first() {
                            value = first.material.roughness();
                        }
                    }
                }
                value.map(ControlValue::Scalar)
            }
            BindTarget::MaterialColor { object } => {
                let obj = scene.objects.get(object)?;
                match &obj.geometry {
                    crate::scene::Geometry::Primitive { material, .. } => {
                        Some(ControlValue::Color(material.color()))
                    }
                    crate::scene::Geometry::Model { meshes } => meshes
                        .first()
                        .map(|m| ControlValue::Color(m.material.color())),
                }
            }
            BindTarget::LightIntensity { light } => scene
                .lights
                .get(light)
                .map(|l| ControlValue::Scalar(l.intensity())),
            BindTarget::LightColor { light } => scene
                .lights
                .get(light)
                .map(|l| ControlValue::Color(l.color())),
            BindTarget::LightPosition { light, axis } => scene
                .lights
                .get(light)
                .and_then(|l| l.position())
                .map(|p| ControlValue::Scalar(p[axis.index()])),
        }
    }

    /// Write `value` through to the live scene. Returns false when the
    /// target does not resolve or the value kind does not match.
    pub fn apply(&self, scene: &mut Scene, value: ControlValue) -> bool {
        match (*self, value) {
            (BindTarget::ObjectRotation { object, axis }, ControlValue::Scalar(v)) => {
                let Some(obj) = scene.objects.get_mut(object) else {
                    return false;
                };
                obj.transform.rotation[axis.index()] = v;
                true
            }
            (BindTarget::MaterialMetalness { object }, ControlValue::Scalar(v)) => {
                let Some(obj) = scene.objects.get_mut(object) else {
                    return false;
                };
                obj.for_each_material(|m| m.set_metalness(v));
                true
            }
            (BindTarget::MaterialRoughness { object }, ControlValue::Scalar(v)) => {
                let Some(obj) = scene.objects.get_mut(object) else {
                    return false;
                };
                obj.for_each_material(|m| m.set_roughness(v));
                true
            }
            (BindTarget::MaterialColor { object }, ControlValue::Color(c)) => {
                let Some(obj) = scene.objects.get_mut(object) else {
                    return false;
                };
                obj.for_each_material(|m| *m.color_mut() = c);
                true
            }
            (BindTarget::LightIntensity { light }, ControlValue::Scalar(v)) => {
                let Some(l) = scene.lights.get_mut(light) else {
                    return false;
                };
                *l.intensity_mut() = v;
                true
            }
            (BindTarget::LightColor { light }, ControlValue::Color(c)) => {
                let Some(l) = scene.lights.get_mut(light) else {
                    return false;
                };
                *l.color_mut() = c;
                true
            }
            (BindTarget::LightPosition { light, axis }, ControlValue::Scalar(v)) => {
                let Some(pos) = scene.lights.get_mut(light).and_then(|l| l.position_mut()) else {
                    return false;
                };
                pos[axis.index()] = v;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
enum ControlKind {
    Slider { range: RangeInclusive<f32> },
    Color,
}

/// A registered control: target, presentation label and widget kind.
#[derive(Debug, Clone)]
pub struct ParameterBinding {
    pub target: BindTarget,
    pub label: String,
    kind: ControlKind,
}

/// Named, nestable presentation group. Grouping carries no binding
/// semantics.
#[derive(Debug, Clone, Default)]
pub struct PanelGroup {
    pub label: String,
    controls: Vec<usize>,
    children: Vec<PanelGroup>,
}

impl PanelGroup {
    fn named(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn children(&self) -> &[PanelGroup] {
        &self.children
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }
}

/// Handle to a registered binding. Valid until the owning panel is
/// destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingHandle {
    index: usize,
    generation: u32,
}

/// Live-binding registry between panel controls and mutable scene state.
///
/// Every control writes through on interaction; there is no batching, so the
/// effect is visible on the next rendered frame. `destroy` releases all
/// bindings and invalidates every previously returned handle.
#[derive(Debug, Clone, Default)]
pub struct ParameterPanel {
    bindings: Vec<ParameterBinding>,
    groups: Vec<PanelGroup>,
    generation: u32,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a numeric slider under the group at `path` (created on
    /// demand, nested per path element).
    pub fn add_control(
        &mut self,
        path: &[&str],
        target: BindTarget,
        range: RangeInclusive<f32>,
        label: &str,
    ) -> BindingHandle {
        self.push_binding(
            path,
            ParameterBinding {
                target,
                label: label.to_string(),
                kind: ControlKind::Slider { range },
            },
        )
    }

    /// Register a color picker under the group at `path`.
    pub fn add_color_control(
        &mut self,
        path: &[&str],
        target: BindTarget,
        label: &str,
    ) -> BindingHandle {
        self.push_binding(
            path,
            ParameterBinding {
                target,
                label: label.to_string(),
                kind: ControlKind::Color,
            },
        )
    }

    fn push_binding(&mut self, path: &[&str], binding: ParameterBinding) -> BindingHandle {
        let index = self.bindings.len();
        self.bindings.push(binding);
        self.group_mut(path).controls.push(index);
        BindingHandle {
            index,
            generation: self.generation,
        }
    }

    fn group_mut(&mut self, path: &[&str]) -> &mut PanelGroup {
        let mut groups = &mut self.groups;
        let mut found: Option<usize> = None;

        for (depth, label) in path.iter().enumerate() {
            let pos = groups.iter().position(|g| g.label == *label);
            let pos = match pos {
                Some(p) => p,
                None => {
                    groups.push(PanelGroup::named(label));
                    groups.len() - 1
                }
            };
            if depth == path.len() - 1 {
                found = Some(pos);
                break;
            }
            groups = &mut groups[pos].children;
        }

        match found {
            Some(pos) => &mut groups[pos],
            None => {
                // Empty path: controls land in an unnamed root group.
                if groups.is_empty() || !groups[0].label.is_empty() {
                    groups.insert(0, PanelGroup::default());
                }
                &mut groups[0]
            }
        }
    }

    /// Write a value through a handle. Returns false for handles issued
    /// before the last `destroy`.
    pub fn apply(&self, handle: BindingHandle, scene: &mut Scene, value: ControlValue) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        match self.bindings.get(handle.index) {
            Some(binding) => binding.target.apply(scene, value),
            None => false,
        }
    }

    /// Read the current value behind a handle.
    pub fn read(&self, handle: BindingHandle, scene: &Scene) -> Option<ControlValue> {
        if handle.generation != self.generation {
            return None;
        }
        self.bindings.get(handle.index)?.target.read(scene)
    }

    /// Release every binding and all panel-owned UI state. Previously
    /// returned handles become invalid.
    pub fn destroy(&mut self) {
        self.bindings.clear();
        self.groups.clear();
        self.generation += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn groups(&self) -> &[PanelGroup] {
        &self.groups
    }

    /// Draw the panel. Each widget interaction writes straight into the
    /// scene, so the change is visible on this same frame's render.
    pub fn ui(&self, ctx: &egui::Context, scene: &mut Scene) {
        if self.groups.is_empty() {
            return;
        }

        egui::SidePanel::left("parameter_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for group in &self.groups {
                        self.group_ui(ui, group, scene);
                    }
                });
            });
    }

    fn group_ui(&self, ui: &mut egui::Ui, group: &PanelGroup, scene: &mut Scene) {
        egui::CollapsingHeader::new(&group.label)
            .default_open(true)
            .show(ui, |ui| {
                for &index in &group.controls {
                    if let Some(binding) = self.bindings.get(index) {
                        self.control_ui(ui, binding, scene);
                    }
                }
                for child in &group.children {
                    self.group_ui(ui, child, scene);
                }
            });
    }

    fn control_ui(&self, ui: &mut egui::Ui, binding: &ParameterBinding, scene: &mut Scene) {
        match &binding.kind {
            ControlKind::Slider { range } => {
                let Some(ControlValue::Scalar(mut value)) = binding.target.read(scene) else {
                    return;
                };
                let response =
                    ui.add(egui::Slider::new(&mut value, range.clone()).text(&binding.label));
                if response.changed() {
                    binding.target.apply(scene, ControlValue::Scalar(value));
                }
            }
            ControlKind::Color => {
                let Some(ControlValue::Color(mut color)) = binding.target.read(scene) else {
                    return;
                };
                ui.horizontal(|ui| {
                    if ui.color_edit_button_rgb(&mut color).changed() {
                        binding.target.apply(scene, ControlValue::Color(color));
                    }
                    ui.label(&binding.label);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::controls::OrbitControls;
    use crate::geometry::box_mesh;
    use crate::light::{Light, WHITE};
    use crate::material::Material;
    use crate::scene::SceneObject;
    use glam::Vec3;

    fn scene_with_box() -> Scene {
        let camera = PerspectiveCamera::new(800, 600);
        let controls = OrbitControls::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut scene = Scene::new(camera, controls);
        scene.objects.push(SceneObject::primitive(
            box_mesh(2.0, 2.0, 2.0),
            Material::standard(WHITE),
        ));
        scene
            .lights
            .push(Light::directional(WHITE, 1.0, Vec3::new(1.0, 2.0, 3.0)));
        scene
    }

    #[test]
    fn binding_writes_through_immediately() {
        let mut scene = scene_with_box();
        let mut panel = ParameterPanel::new();
        let handle = panel.add_control(
            &["Material"],
            BindTarget::MaterialMetalness { object: 0 },
            0.0..=1.0,
            "Metalness",
        );

        assert!(panel.apply(handle, &mut scene, ControlValue::Scalar(0.75)));
        assert_eq!(
            scene.objects[0].material().unwrap().metalness(),
            Some(0.75)
        );
        assert_eq!(
            panel.read(handle, &scene),
            Some(ControlValue::Scalar(0.75))
        );
    }

    #[test]
    fn light_position_binding_moves_one_axis() {
        let mut scene = scene_with_box();
        let mut panel = ParameterPanel::new();
        let handle = panel.add_control(
            &["Light Positions", "Directional Light"],
            BindTarget::LightPosition {
                light: 0,
                axis: Axis::Y,
            },
            -10.0..=10.0,
            "Y Position",
        );

        assert!(panel.apply(handle, &mut scene, ControlValue::Scalar(-4.0)));
        let pos = scene.lights[0].position().unwrap();
        assert_eq!(pos, Vec3::new(1.0, -4.0, 3.0));
    }

    #[test]
    fn groups_nest_by_path() {
        let mut panel = ParameterPanel::new();
        panel.add_control(
            &["Light Positions", "Directional Light"],
            BindTarget::LightIntensity { light: 0 },
            0.0..=2.0,
            "Intensity",
        );
        panel.add_control(
            &["Light Positions", "Point Light"],
            BindTarget::LightIntensity { light: 0 },
            0.0..=2.0,
            "Intensity",
        );

        let groups = panel.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Light Positions");
        assert_eq!(groups[0].children().len(), 2);
        assert_eq!(groups[0].control_count(), 0);
    }

    #[test]
    fn destroy_invalidates_previous_handles() {
        let mut scene = scene_with_box();
        let mut panel = ParameterPanel::new();
        let handle = panel.add_control(
            &["Material"],
            BindTarget::MaterialRoughness { object: 0 },
            0.0..=1.0,
            "Roughness",
        );

        panel.destroy();
        assert!(panel.is_empty());
        assert!(panel.groups().is_empty());
        assert!(!panel.apply(handle, &mut scene, ControlValue::Scalar(0.2)));
        assert_eq!(panel.read(handle, &scene), None);
        // The scene is untouched by the stale handle.
        assert_eq!(scene.objects[0].material().unwrap().roughness(), Some(1.0));
    }

    #[test]
    fn unresolved_target_reads_absent_without_fault() {
        let scene = scene_with_box();
        let target = BindTarget::MaterialMetalness { object: 5 };
        assert_eq!(target.read(&scene), None);

        let mut scene = scene;
        assert!(!target.apply(&mut scene, ControlValue::Scalar(0.5)));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut scene = scene_with_box();
        let target = BindTarget::LightIntensity { light: 0 };
        assert!(!target.apply(&mut scene, ControlValue::Color([1.0, 0.0, 0.0])));
        assert_eq!(scene.lights[0].intensity(), 1.0);
    }
}
