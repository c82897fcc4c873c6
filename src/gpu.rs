use std::sync::Arc;

use glam::Mat4;
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::RenderError;
use crate::material::{Material, TextureChannel, TextureImage};
use crate::panel::ParameterPanel;
use crate::render_loop::FrameStats;
use crate::renderer::SceneRenderer;
use crate::scene::{Geometry, Scene, SceneObject};

const MAX_LIGHTS: usize = 8;
/// Fixed capacity of the helper-line vertex buffer.
const HELPER_VERTEX_CAPACITY: usize = 512;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 3],
}

const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuLight {
    /// xyz = position, w = kind code
    position: [f32; 4],
    /// rgb = color, w = intensity
    color: [f32; 4],
    /// xyz = spot aim axis, w = point falloff distance
    direction: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LightsUniform {
    count: [u32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    /// rgb = base color, w = metalness
    color: [f32; 4],
    /// x = roughness, yzw = map-enable flags
    params: [f32; 4],
}

/// GPU buffers for one drawable mesh.
struct MeshEntry {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
    /// Edge index buffer, present for wireframe materials.
    lines: Option<(wgpu::Buffer, u32)>,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    wireframe: bool,
    map_views: [Option<wgpu::TextureView>; 3],
}

/// Everything owned by the currently mounted scene.
struct SceneResources {
    globals: wgpu::Buffer,
    lights: wgpu::Buffer,
    globals_bind: wgpu::BindGroup,
    helper_vertices: wgpu::Buffer,
    helper_count: u32,
    objects: Vec<Vec<MeshEntry>>,
}

/// wgpu-backed implementation of [`SceneRenderer`], plus the egui overlay
/// host. Pipelines, samplers and fallback textures outlive scene switches;
/// everything in [`SceneResources`] is torn down on `dispose`.
pub struct GpuRenderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    lit_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    globals_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_white: wgpu::TextureView,
    default_normal: wgpu::TextureView,

    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,

    scene_res: Option<SceneResources>,
    resources: usize,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>, show_ui: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("line_pipeline_layout"),
                bind_group_layouts: &[&globals_layout],
                push_constant_ranges: &[],
            });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let wire_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wireframe_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/wireframe.wgsl").into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lines.wgsl").into()),
        });

        let mesh_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        };
        let position_only_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES[0..1],
        };
        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LINE_ATTRIBUTES,
        };

        let lit_pipeline = create_pipeline(
            &device,
            "lit_pipeline",
            &pipeline_layout,
            &scene_shader,
            mesh_vertex_layout,
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
        );
        let wire_pipeline = create_pipeline(
            &device,
            "wire_pipeline",
            &pipeline_layout,
            &wire_shader,
            position_only_layout,
            wgpu::PrimitiveTopology::LineList,
            surface_format,
        );
        let line_pipeline = create_pipeline(
            &device,
            "line_pipeline",
            &line_pipeline_layout,
            &line_shader,
            line_vertex_layout,
            wgpu::PrimitiveTopology::LineList,
            surface_format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let default_white = upload_texture(
            &device,
            &queue,
            &TextureImage {
                width: 1,
                height: 1,
                pixels: vec![255, 255, 255, 255],
            },
        );
        let default_normal = upload_texture(
            &device,
            &queue,
            &TextureImage {
                width: 1,
                height: 1,
                pixels: vec![128, 128, 255, 255],
            },
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        info!("renderer initialized at {}x{}", config.width, config.height);

        Ok(Self {
            window,
            device,
            queue,
            surface,
            config,
            depth_view,
            lit_pipeline,
            wire_pipeline,
            line_pipeline,
            globals_layout,
            object_layout,
            sampler,
            default_white,
            default_normal,
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui,
            scene_res: None,
            resources: 0,
        })
    }

    /// Give egui first refusal on a window event. Returns true when
    /// consumed.
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.egui_state
            .on_window_event(&self.window, event)
            .consumed
    }

    fn build_entries(&mut self, object: &SceneObject) -> Vec<MeshEntry> {
        match &object.geometry {
            Geometry::Primitive { mesh, material } => {
                vec![self.build_entry(mesh, material)]
            }
            Geometry::Model { meshes } => meshes
                .iter()
                .map(|m| self.build_entry(&m.mesh, &m.material))
                .collect(),
        }
    }

    fn build_entry(&mut self, mesh: &crate::geometry::MeshData, material: &Material) -> MeshEntry {
        let vertices: Vec<Vertex> = (0..mesh.positions.len())
            .map(|i| Vertex {
                position: mesh.positions[i],
                normal: *mesh.normals.get(i).unwrap_or(&[0.0, 1.0, 0.0]),
                uv: *mesh.uvs.get(i).unwrap_or(&[0.0, 0.0]),
            })
            .collect();

        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.resources += 2;

        let wireframe = material.is_wireframe();
        let lines = if wireframe {
            let line_indices = mesh.line_indices();
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_edges"),
                    contents: bytemuck::cast_slice(&line_indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            self.resources += 1;
            Some((buffer, line_indices.len() as u32))
        } else {
            None
        };

        let uniform = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniform"),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.resources += 1;

        let map_views = [None, None, None];
        let bind_group = self.object_bind_group(&uniform, &map_views);

        MeshEntry {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
            lines,
            uniform,
            bind_group,
            wireframe,
            map_views,
        }
    }

    fn object_bind_group(
        &self,
        uniform: &wgpu::Buffer,
        map_views: &[Option<wgpu::TextureView>; 3],
    ) -> wgpu::BindGroup {
        let color = map_views[0].as_ref().unwrap_or(&self.default_white);
        let roughness = map_views[1].as_ref().unwrap_or(&self.default_white);
        let normal = map_views[2].as_ref().unwrap_or(&self.default_normal);

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(color),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(roughness),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn write_frame_uniforms(&self, scene: &Scene) {
        let Some(res) = &self.scene_res else {
            return;
        };

        let view_proj = scene.camera.view_projection(scene.controls.target);
        let globals = GlobalsUniform {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: [
                scene.camera.position.x,
                scene.camera.position.y,
                scene.camera.position.z,
                1.0,
            ],
        };
        self.queue
            .write_buffer(&res.globals, 0, bytemuck::cast_slice(&[globals]));

        let mut lights = LightsUniform {
            count: [scene.lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
            lights: [GpuLight {
                position: [0.0; 4],
                color: [0.0; 4],
                direction: [0.0; 4],
            }; MAX_LIGHTS],
        };
        for (i, light) in scene.lights.iter().take(MAX_LIGHTS).enumerate() {
            let kind = match light {
                crate::light::Light::Ambient { .. } => 0.0,
                crate::light::Light::Directional { .. } => 1.0,
                crate::light::Light::Point { .. } => 2.0,
                crate::light::Light::Spot { .. } => 3.0,
            };
            let position = light.position().unwrap_or(glam::Vec3::ZERO);
            let color = light.color();

            let mut direction = [0.0f32; 4];
            if let crate::light::Light::Point { distance, .. } = light {
                direction[3] = *distance;
            }
            if let crate::light::Light::Spot { target, .. } = light {
                let aim = (position - scene.resolve_light_target(Some(*target)))
                    .normalize_or_zero();
                direction = [aim.x, aim.y, aim.z, 0.0];
            }

            lights.lights[i] = GpuLight {
                position: [position.x, position.y, position.z, kind],
                color: [color[0], color[1], color[2], light.intensity()],
                direction,
            };
        }
        self.queue
            .write_buffer(&res.lights, 0, bytemuck::cast_slice(&[lights]));

        for (object, entries) in scene.objects.iter().zip(&res.objects) {
            let model = object.transform.matrix();
            match &object.geometry {
                Geometry::Primitive { material, .. } => {
                    if let Some(entry) = entries.first() {
                        let uniform = object_uniform(model, material, entry);
                        self.queue
                            .write_buffer(&entry.uniform, 0, bytemuck::cast_slice(&[uniform]));
                    }
                }
                Geometry::Model { meshes } => {
                    for (mesh, entry) in meshes.iter().zip(entries) {
                        let uniform = object_uniform(model, &mesh.material, entry);
                        self.queue
                            .write_buffer(&entry.uniform, 0, bytemuck::cast_slice(&[uniform]));
                    }
                }
            }
        }
    }

    fn write_helper_lines(&mut self, scene: &Scene) {
        let Some(res) = &mut self.scene_res else {
            return;
        };

        let mut vertices: Vec<LineVertex> = Vec::new();
        for helper in &scene.helpers {
            for line in &helper.lines {
                vertices.push(LineVertex {
                    position: line.start.to_array(),
                    color: line.color,
                });
                vertices.push(LineVertex {
                    position: line.end.to_array(),
                    color: line.color,
                });
            }
        }
        vertices.truncate(HELPER_VERTEX_CAPACITY);

        res.helper_count = vertices.len() as u32;
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&res.helper_vertices, 0, bytemuck::cast_slice(&vertices));
        }
    }
}

impl SceneRenderer for GpuRenderer {
    fn upload_scene(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.dispose();

        let globals = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_uniform"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lights_uniform"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let helper_vertices = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper_lines"),
            size: (HELPER_VERTEX_CAPACITY * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.resources += 3;

        let globals_bind = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &self.globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.as_entire_binding(),
                },
            ],
        });

        let objects = scene
            .objects
            .iter()
            .map(|object| self.build_entries(object))
            .collect();

        self.scene_res = Some(SceneResources {
            globals,
            lights,
            globals_bind,
            helper_vertices,
            helper_count: 0,
            objects,
        });

        Ok(())
    }

    fn attach_object(&mut self, scene: &Scene, object: usize) -> Result<(), RenderError> {
        let Some(scene_object) = scene.objects.get(object) else {
            return Err(RenderError::Other(format!(
                "attach_object: no object at index {}",
                object
            )));
        };

        let entries = self.build_entries(scene_object);
        let Some(res) = &mut self.scene_res else {
            return Err(RenderError::Other("attach_object before upload".into()));
        };
        if res.objects.len() <= object {
            res.objects.resize_with(object + 1, Vec::new);
        }
        res.objects[object] = entries;
        Ok(())
    }

    fn apply_texture(&mut self, object: usize, channel: TextureChannel, image: &TextureImage) {
        let view = upload_texture(&self.device, &self.queue, image);
        self.resources += 1;

        let slot = match channel {
            TextureChannel::Color => 0,
            TextureChannel::Roughness => 1,
            TextureChannel::Normal => 2,
        };

        // Rebuild affected bind groups outside the mutable borrow of
        // scene resources.
        let mut rebuilt = Vec::new();
        if let Some(res) = &mut self.scene_res {
            if let Some(entries) = res.objects.get_mut(object) {
                for entry in entries.iter_mut() {
                    if entry.wireframe {
                        continue;
                    }
                    entry.map_views[slot] = Some(view.clone());
                }
            }
        }
        if let Some(res) = &self.scene_res {
            if let Some(entries) = res.objects.get(object) {
                for (i, entry) in entries.iter().enumerate() {
                    if entry.wireframe {
                        continue;
                    }
                    rebuilt.push((i, self.object_bind_group(&entry.uniform, &entry.map_views)));
                }
            }
        }
        if let Some(res) = &mut self.scene_res {
            if let Some(entries) = res.objects.get_mut(object) {
                for (i, bind_group) in rebuilt {
                    entries[i].bind_group = bind_group;
                }
            }
        }
    }

    fn render(
        &mut self,
        scene: &mut Scene,
        panel: &mut ParameterPanel,
        stats: &FrameStats,
    ) -> Result<(), RenderError> {
        self.write_frame_uniforms(scene);
        self.write_helper_lines(scene);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => {
                // Lost/outdated surfaces recover by reconfiguring at the
                // current size; the frame is skipped.
                warn!("surface error, reconfiguring: {:?}", e);
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.015,
                            g: 0.015,
                            b: 0.02,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(res) = &self.scene_res {
                pass.set_bind_group(0, &res.globals_bind, &[]);

                for entries in &res.objects {
                    for entry in entries {
                        pass.set_bind_group(1, &entry.bind_group, &[]);
                        pass.set_vertex_buffer(0, entry.vertex.slice(..));
                        if entry.wireframe {
                            if let Some((lines, count)) = &entry.lines {
                                pass.set_pipeline(&self.wire_pipeline);
                                pass.set_index_buffer(lines.slice(..), wgpu::IndexFormat::Uint32);
                                pass.draw_indexed(0..*count, 0, 0..1);
                            }
                        } else {
                            pass.set_pipeline(&self.lit_pipeline);
                            pass.set_index_buffer(
                                entry.index.slice(..),
                                wgpu::IndexFormat::Uint32,
                            );
                            pass.draw_indexed(0..entry.index_count, 0, 0..1);
                        }
                    }
                }

                if res.helper_count > 0 {
                    pass.set_pipeline(&self.line_pipeline);
                    pass.set_bind_group(0, &res.globals_bind, &[]);
                    pass.set_vertex_buffer(0, res.helper_vertices.slice(..));
                    pass.draw(0..res.helper_count, 0..1);
                }
            }
        }

        // egui overlay: parameter panel plus the FPS readout.
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let show_ui = self.show_ui;
        let fps = stats.fps;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !show_ui {
                return;
            }
            panel.ui(ctx, scene);
            egui::Window::new("FPS")
                .title_bar(false)
                .resizable(false)
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0}", fps))
                            .size(32.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.label(
                        egui::RichText::new("FPS")
                            .size(11.0)
                            .color(egui::Color32::GRAY),
                    );
                });
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the
            // encoder, but egui-wgpu requires 'static. This is safe because
            // we drop the render pass before using the encoder again.
            let pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut pass,
                )
            };
            self.egui_renderer
                .render(pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resource_count(&self) -> usize {
        self.resources
    }

    fn dispose(&mut self) {
        self.scene_res = None;
        self.resources = 0;
    }
}

fn object_uniform(model: Mat4, material: &Material, entry: &MeshEntry) -> ObjectUniform {
    match material {
        Material::Standard {
            base_color,
            metalness,
            roughness,
            ..
        } => ObjectUniform {
            model: model.to_cols_array_2d(),
            color: [base_color[0], base_color[1], base_color[2], *metalness],
            params: [
                *roughness,
                flag(entry.map_views[0].is_some()),
                flag(entry.map_views[1].is_some()),
                flag(entry.map_views[2].is_some()),
            ],
        },
        Material::Wireframe { color } => ObjectUniform {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], 0.0],
            params: [1.0, 0.0, 0.0, 0.0],
        },
    }
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout,
    topology: wgpu::PrimitiveTopology,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("material_map"),
        size: wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
