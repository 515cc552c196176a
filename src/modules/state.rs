use std::sync::Arc;

use anyhow::{Context as _, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::modules::overlay::{EguiOverlay, OverlayResponse};
use crate::modules::view::ViewState;
use crate::modules::watch::{self, LIGHT_POSITION};

const WATCH_SHADER: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
    normal_mat: mat4x4<f32>,
    light_pos: vec4<f32>,
    // Base color in rgb, gloss exponent in w.
    material: vec4<f32>,
}
@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexOut {
    @builtin(position) clip_pos: vec4<f32>,
    @location(0) pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOut {
    var out: VertexOut;
    let world = vec4<f32>(position, 1.0);
    out.pos = world.xyz;
    out.normal = normalize((u.normal_mat * vec4<f32>(normal, 0.0)).xyz);
    out.clip_pos = u.mvp * world;
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let l = normalize(u.light_pos.xyz - in.pos);
    let v = normalize(-in.pos);
    let h = normalize(l + v);
    let diff = max(dot(n, l), 0.0);
    let spec = pow(max(dot(n, h), 0.0), u.material.w);
    var metal = u.material.rgb * (0.15 + 0.85 * diff) + vec3<f32>(1.0) * spec * 0.8;
    // Cool-toned reflection tint.
    metal += vec3<f32>(0.05, 0.09, 0.15) * (0.5 + 0.5 * n.y);
    return vec4<f32>(metal, 1.0);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PartUniforms {
    mvp: [[f32; 4]; 4],
    normal_mat: [[f32; 4]; 4],
    light_pos: [f32; 4],
    material: [f32; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// GPU state for the watch viewer. Every handle lives inside it, so dropping
/// the state releases all driver resources at teardown.
pub struct State {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
}

impl State {
    pub async fn new(window: Arc<Window>) -> Result<State> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .context("no compatible graphics adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .context("failed to create graphics device")?;
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create render surface")?;
        let cap = surface.get_capabilities(&adapter);
        let surface_format = cap.formats[0];

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("watch_uniform_bind_group_layout"),
        });

        // Shader or pipeline validation failures are diagnostics, not
        // crashes; the viewer degrades to a blank surface.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = Self::create_watch_pipeline(
            &device,
            surface_format.add_srgb_suffix(),
            &bind_group_layout,
        );
        if let Some(err) = device.pop_error_scope().await {
            log::error!("watch shader failed validation: {err}");
        }

        let meshes = watch::draw_list()
            .iter()
            .map(|cmd| Self::upload_mesh(&device, &bind_group_layout, cmd.part))
            .collect();

        let size = Self::surface_size(&window);
        let depth_view = Self::create_depth_texture(&device, size);

        let state = State {
            window,
            device,
            queue,
            size,
            surface,
            surface_format,
            pipeline,
            depth_view,
            meshes,
        };
        state.configure_surface();
        Ok(state)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Format the overlay must target: the view the frame is rendered into.
    pub fn overlay_format(&self) -> wgpu::TextureFormat {
        self.surface_format.add_srgb_suffix()
    }

    fn upload_mesh(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        part: watch::WatchPart,
    ) -> GpuMesh {
        let data = watch::build_part(part);
        let vertices: Vec<Vertex> = data
            .positions
            .iter()
            .zip(&data.normals)
            .map(|(p, n)| Vertex {
                position: *p,
                normal: *n,
            })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("watch part VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("watch part IB"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("watch part uniforms"),
            size: std::mem::size_of::<PartUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("watch_uniform_bind_group"),
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    fn create_watch_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Watch Shader"),
            source: wgpu::ShaderSource::Wgsl(WATCH_SHADER.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Watch Pipeline"),
            layout: Some(
                &device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Watch Pipeline Layout"),
                    bind_group_layouts: &[bind_group_layout],
                    push_constant_ranges: &[],
                }),
            ),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // No culling: the crystal disc and straps are single-sided sheets
            // that stay visible from behind, matching the source model.
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("watch depth texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    /// Drawing-surface size: the window's display size at a device pixel
    /// ratio capped at 2x.
    fn surface_size(window: &Window) -> PhysicalSize<u32> {
        let scale = window.scale_factor();
        let capped = scale.min(2.0);
        let logical = window.inner_size().to_logical::<f64>(scale);
        PhysicalSize::new(
            (logical.width * capped).round().max(1.0) as u32,
            (logical.height * capped).round().max(1.0) as u32,
        )
    }

    /// Reconfigure only when the target size actually changed.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size == self.size || new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.configure_surface();
        self.depth_view = Self::create_depth_texture(&self.device, new_size);
    }

    pub fn resize_to_window(&mut self) {
        let target = Self::surface_size(&self.window);
        self.resize(target);
    }

    fn configure_surface(&self) {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.surface_format,
            view_formats: vec![self.surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width,
            height: self.size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    /// Render one frame and return any overlay button clicks.
    pub fn render(&mut self, view: &ViewState, overlay: &mut EguiOverlay) -> OverlayResponse {
        self.resize_to_window();

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.configure_surface();
                return OverlayResponse::default();
            }
            Err(e) => {
                log::error!("surface error: {e}");
                return OverlayResponse::default();
            }
        };
        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.surface_format.add_srgb_suffix()),
                ..Default::default()
            });

        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;
        let frame = watch::frame_transforms(view, aspect);
        for (mesh, cmd) in self.meshes.iter().zip(watch::draw_list()) {
            let uniforms = PartUniforms {
                mvp: frame.mvp.to_cols_array_2d(),
                normal_mat: Mat4::from_mat3(frame.normal).to_cols_array_2d(),
                light_pos: [
                    LIGHT_POSITION[0],
                    LIGHT_POSITION[1],
                    LIGHT_POSITION[2],
                    1.0,
                ],
                material: [
                    cmd.base_color[0],
                    cmd.base_color[1],
                    cmd.base_color[2],
                    cmd.gloss,
                ],
            };
            self.queue
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut encoder = self.device.create_command_encoder(&Default::default());

        overlay.begin_frame(&self.window);
        let response = overlay.controls();

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Watch Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.008,
                            g: 0.016,
                            b: 0.035,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            for mesh in &self.meshes {
                render_pass.set_bind_group(0, &mesh.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        overlay.end_frame_and_draw(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &texture_view,
            egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.size.width, self.size.height],
                pixels_per_point: self.window.scale_factor().min(2.0) as f32,
            },
        );

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_pipeline_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn uniform_block_is_tightly_packed() {
        // mat4 + mat4 + vec4 + vec4, no implicit padding.
        assert_eq!(std::mem::size_of::<PartUniforms>(), 64 + 64 + 16 + 16);
    }
}
