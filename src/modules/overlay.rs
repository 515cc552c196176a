use egui::Context;
use egui_wgpu::{Renderer, ScreenDescriptor};
use egui_winit::State;
use wgpu::{CommandEncoder, Device, Queue, TextureView};
use winit::event::WindowEvent;
use winit::window::Window;

/// Button clicks reported back to the app, which applies them to the shared
/// view state. Keeps the single-writer discipline on zoom.
#[derive(Clone, Copy, Default)]
pub struct OverlayResponse {
    pub zoom_in: bool,
    pub zoom_out: bool,
}

/// egui overlay hosting the zoom buttons and the usage hint.
pub struct EguiOverlay {
    state: State,
    renderer: Renderer,
    frame_started: bool,
}

impl EguiOverlay {
    pub fn new(device: &Device, output_color_format: wgpu::TextureFormat, window: &Window) -> Self {
        let egui_ctx = Context::default();
        let egui_state = State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = Renderer::new(device, output_color_format, None, 1, true);

        Self {
            state: egui_state,
            renderer,
            frame_started: false,
        }
    }

    /// Feed a window event to egui. Returns true when egui consumed it, in
    /// which case it must not reach the pointer controller.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.state.egui_ctx().begin_pass(raw_input);
        self.frame_started = true;
    }

    /// Build the control strip for this frame: "Zoom"/"Out" buttons plus the
    /// interaction hint.
    pub fn controls(&self) -> OverlayResponse {
        let mut response = OverlayResponse::default();
        egui::Area::new(egui::Id::new("viewer_controls"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(16.0, -16.0))
            .show(self.state.egui_ctx(), |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Zoom").clicked() {
                        response.zoom_in = true;
                    }
                    if ui.button("Out").clicked() {
                        response.zoom_out = true;
                    }
                    ui.label("Drag to rotate · Scroll to zoom");
                });
            });
        response
    }

    /// Finish the egui pass and draw it over the already-rendered frame.
    pub fn end_frame_and_draw(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        target_view: &TextureView,
        screen_descriptor: ScreenDescriptor,
    ) {
        if !self.frame_started {
            return;
        }
        self.frame_started = false;

        let full_output = self.state.egui_ctx().end_pass();
        self.state
            .handle_platform_output(window, full_output.platform_output);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let clipped_primitives = self
            .state
            .egui_ctx()
            .tessellate(full_output.shapes, screen_descriptor.pixels_per_point);

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut rpass, &clipped_primitives, &screen_descriptor);
        }

        for tex_id in &full_output.textures_delta.free {
            self.renderer.free_texture(tex_id);
        }
    }
}
