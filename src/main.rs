use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::{event::*, event_loop::EventLoop, window::Window};

// Import from the library crate
use meshxr::{logging, ui, controller, model, view};

use controller::{AnimationPlayer, InteractionMode, Labels, ObjectInteractor, PlaybackTask, TextLabel};
use meshxr::config::InteractionConfig;
use model::AnimationData;
use ui::{PanelAction, PanelState};
use view::GpuContext;

const BACKDROP: wgpu::Color = wgpu::Color { r: 0.08, g: 0.08, b: 0.1, a: 1.0 };

/// Desktop playback monitor: the speed slider, labels and live vertex colors of one animation
struct App {
    window: Arc<Window>,
    gpu: GpuContext,

    // egui
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Playback
    interactor: ObjectInteractor,
    time_label: TextLabel,
    speed_label: TextLabel,
    task: PlaybackTask,
    source: String,
    clock: Instant,
}

impl App {
    async fn new(window: Arc<Window>, task: PlaybackTask, config: &InteractionConfig, source: String) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone()).expect("Failed to create surface");
        let gpu = GpuContext::new_native(&instance, surface, size.width, size.height).await;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.format,
            egui_wgpu::RendererOptions::default(),
        );

        // Page-style labels: the panel reads back whatever the interactor last wrote
        let time_label = TextLabel::new();
        let speed_label = TextLabel::new();
        let labels = Labels::new(time_label.clone(), speed_label.clone());
        // No mesh is drawn here, so the camera offset is irrelevant
        let interactor = ObjectInteractor::new(InteractionMode::Desktop, labels, 0.0, config);

        let mut app = Self {
            window,
            gpu,
            egui_renderer,
            egui_state,
            egui_ctx,
            interactor,
            time_label,
            speed_label,
            task,
            source,
            clock: Instant::now(),
        };
        let now = app.now_ms();
        app.task.start(now);
        app
    }

    fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(self.window.as_ref(), event);
        if response.repaint {
            self.window.request_redraw();
        }
        response.consumed
    }

    fn update(&mut self) {
        let now = self.now_ms();
        self.task.poll(now, &mut self.interactor);
    }

    fn apply(&mut self, action: PanelAction) {
        let now = self.now_ms();
        match action {
            PanelAction::Pause => self.task.pause(now),
            PanelAction::Resume => self.task.resume(now),
            PanelAction::Restart => self.task.start(now),
        }
    }

    fn render_ui(&mut self) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let panel = PanelState {
            time_label: &self.time_label,
            speed_label: &self.speed_label,
            playback: Some(self.task.state()),
            source: &self.source,
        };
        let (mut output, action) = ui::build_ui(&self.egui_ctx, raw_input, &panel, &mut self.interactor);
        if let Some(action) = action {
            self.apply(action);
        }
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut output.platform_output));
        output
    }

    /// Clear to the backdrop and paint the egui panel in one pass
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let output = self.render_ui();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: self.gpu.size_in_pixels(),
            pixels_per_point: output.pixels_per_point,
        };
        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        let (device, queue) = (&self.gpu.device, &self.gpu.queue);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("monitor_encoder") });
        for (id, delta) in &output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, delta);
        }
        self.egui_renderer.update_buffers(device, queue, &mut encoder, &primitives, &screen);

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("monitor_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKDROP),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        self.egui_renderer.render(&mut pass.forget_lifetime(), &primitives, &screen);

        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn load_config(path: Option<String>) -> Result<InteractionConfig, String> {
    let Some(path) = path else {
        return Ok(InteractionConfig::default());
    };
    let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
    InteractionConfig::from_json(&text).map_err(|e| format!("{path}: {e}"))
}

fn main() {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(animation_path) = args.next() else {
        error!("usage: meshxr <animation.json> [config.json]");
        std::process::exit(2);
    };

    let config = match load_config(args.next()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    let frames = match AnimationData::from_path(&animation_path).and_then(AnimationData::into_frames) {
        Ok(frames) => frames,
        Err(e) => {
            error!(error = %e, path = %animation_path, "failed to load animation data");
            std::process::exit(1);
        }
    };
    info!(
        path = %animation_path,
        frames = frames.len(),
        vertices = frames.vertex_count(),
        duration_s = frames.duration(),
        "animation loaded"
    );
    let task = PlaybackTask::new(AnimationPlayer::new(frames, config.final_frame_interval_ms));

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let window_attributes = Window::default_attributes()
        .with_title(format!("meshxr - {animation_path}"))
        .with_inner_size(winit::dpi::LogicalSize::new(480, 320));
    let window = Arc::new(event_loop.create_window(window_attributes).expect("Failed to create window"));

    let mut app = pollster::block_on(App::new(window.clone(), task, &config, animation_path));

    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.gpu.resize(physical_size.width, physical_size.height);
                        }
                        WindowEvent::RedrawRequested => {
                            app.update();

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    let size = app.window.inner_size();
                                    app.gpu.resize(size.width, size.height);
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => warn!(error = ?e, "surface error"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    });

    if let Err(e) = result {
        error!(error = %e, "event loop terminated");
    }
}
