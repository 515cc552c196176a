use crate::modules::overlay::EguiOverlay;
use crate::modules::state::State;
use crate::modules::view::{PointerController, ViewState};
use glam::Vec2;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

#[derive(Default)]
pub struct App {
    // Kept separately from the GPU state so the window stays open (blank)
    // when no graphics context could be acquired.
    window: Option<Arc<Window>>,
    state: Option<State>,
    overlay: Option<EguiOverlay>,
    view: ViewState,
    pointer: PointerController,
    cursor: Vec2,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Chronomaster Aura")
            .with_inner_size(LogicalSize::new(720.0, 720.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        // If the graphics context cannot be acquired the viewer shows a blank
        // window for the session; no retry.
        match pollster::block_on(State::new(window.clone())) {
            Ok(state) => {
                self.overlay = Some(EguiOverlay::new(
                    state.device(),
                    state.overlay_format(),
                    &window,
                ));
                self.state = Some(state);
                window.request_redraw();
            }
            Err(e) => {
                log::error!("3D viewer disabled: {e:#}");
            }
        }
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        // Releases end a drag even when egui swallows the event, so drags
        // never get stuck on the overlay.
        if matches!(
            event,
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Released,
                ..
            }
        ) {
            self.pointer.pointer_up();
        }

        if let Some(overlay) = self.overlay.as_mut() {
            if overlay.on_window_event(state.window(), &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                state.resize_to_window();
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.pointer.pointer_move(self.cursor, &mut self.view);
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.pointer.pointer_down(self.cursor);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                if amount != 0.0 {
                    self.view.apply_wheel(amount > 0.0);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(overlay) = self.overlay.as_mut() {
                    let response = state.render(&self.view, overlay);
                    if response.zoom_in {
                        self.view.zoom_in();
                    }
                    if response.zoom_out {
                        self.view.zoom_out();
                    }
                }
                // Continuous loop: re-queue the next frame. Stops when the
                // event loop exits.
                state.window().request_redraw();
            }

            _ => (),
        }
    }
}
