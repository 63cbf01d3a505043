//! Gooon -- a five-minute tap-to-start countdown.
//!
//! winit drives the event loop via `ApplicationHandler` and stands in for the
//! mobile host: its callbacks are translated one-to-one into `GameContext`
//! handlers.
//!
//!   - `resumed` / `suspended` -- open / release the expiry audio cue
//!   - `Resized` -- viewport configuration
//!   - `Touch` and the left mouse button -- pointer events, normalised into
//!     touch slots by `TouchTracker`
//!   - `RedrawRequested` -- `on_draw`; if the game reports a new logical frame,
//!     the scene graph is turned into one quad mesh and drawn with wgpu
//!
//! The sprite sheet is loaded before the event loop starts. A missing or
//! broken asset is fatal: it is logged and the process exits non-zero.

mod atlas;
mod audio;
mod context;
mod error;
mod mesh;
#[cfg(test)]
mod replay;
mod scene;

use std::sync::Arc;
use std::time::Instant;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase as HostTouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use atlas::{load_sprite_sheet, SpriteSheet};
use audio::ExpiryCue;
use context::{GameConfig, GameContext};
use gooon_core::input::{TouchEvent, TouchTracker, MOUSE_POINTER_ID};
use gooon_platform::window::PlatformConfig;
use gooon_render::gpu_context::CLEAR_COLOR;
use gooon_render::{GpuContext, ScreenCamera, SpritePipeline, SpriteVertex, Texture};
use mesh::{build_sprite_mesh, MAX_QUADS};

/// GPU side of the app. Created in `resumed` once the window exists.
struct RenderState {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: ScreenCamera,
    sprite_pipeline: SpritePipeline,
    sheet_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl RenderState {
    fn new(window: Arc<Window>, sheet: &image::RgbaImage) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let camera = ScreenCamera::new(gpu.size.0, gpu.size.1);
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);

        let texture = Texture::from_image(&gpu.device, &gpu.queue, sheet, "tx_letters");
        let sheet_bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &texture);

        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (MAX_QUADS * 4 * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Index Buffer"),
            size: (MAX_QUADS * 6 * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        Ok(Self {
            window,
            gpu,
            camera,
            sprite_pipeline,
            sheet_bind_group,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.camera.viewport = (width, height);
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
    }

    fn render(&mut self, game: &GameContext<ExpiryCue>) {
        let mesh = build_sprite_mesh(game.scene(), game.atlas());
        if !mesh.vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if !mesh.indices.is_empty() {
                pass.set_pipeline(&self.sprite_pipeline.pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_bind_group(1, &self.sheet_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
            }
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    config: PlatformConfig,
    game_config: GameConfig,
    sheet_image: image::RgbaImage,
    game: GameContext<ExpiryCue>,
    touches: TouchTracker,
    render: Option<RenderState>,
    fatal: Option<String>,
}

impl App {
    fn new(game_config: GameConfig, sheet: SpriteSheet) -> Self {
        let game = GameContext::new(&game_config, sheet.atlas, Instant::now());
        Self {
            config: PlatformConfig::default(),
            game_config,
            sheet_image: sheet.image,
            game,
            touches: TouchTracker::new(),
            render: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, reason: String) {
        log::error!("{}", reason);
        self.fatal = Some(reason);
        event_loop.exit();
    }

    fn dispatch_touch(&mut self, touch: Option<TouchEvent>) {
        if let Some(touch) = touch {
            log::trace!("touch {:?}", touch);
            self.game.on_touch(touch, Instant::now());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render.is_none() {
            let window = gooon_platform::window::create_window(event_loop, &self.config);
            let window = match window {
                Ok(window) => window,
                Err(reason) => return self.fail(event_loop, reason),
            };
            match RenderState::new(window, &self.sheet_image) {
                Ok(render) => {
                    let (w, h) = render.gpu.size;
                    log::info!("Window created: {}x{}", w, h);
                    self.game.on_config(w, h);
                    self.render = Some(render);
                }
                Err(reason) => return self.fail(event_loop, reason),
            }
        }

        match ExpiryCue::open(&self.game_config.expiry_cue_path) {
            Ok(cue) => self.game.on_visible(cue),
            Err(err) => self.fail(event_loop, err.to_string()),
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        drop(self.game.on_invisible());
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(render) = &self.render {
            render.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let (w, h) = (physical_size.width, physical_size.height);
                if w > 0 && h > 0 {
                    if let Some(render) = self.render.as_mut() {
                        render.resize(w, h);
                    }
                    self.game.on_config(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Touch(touch) => {
                let ev = match touch.phase {
                    HostTouchPhase::Started => self.touches.pointer_down(touch.id),
                    HostTouchPhase::Moved => self.touches.pointer_moved(touch.id),
                    HostTouchPhase::Ended => self.touches.pointer_up(touch.id),
                    HostTouchPhase::Cancelled => {
                        self.touches.pointer_cancelled(touch.id);
                        None
                    }
                };
                self.dispatch_touch(ev);
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let ev = match state {
                    ElementState::Pressed => self.touches.pointer_down(MOUSE_POINTER_ID),
                    ElementState::Released => self.touches.pointer_up(MOUSE_POINTER_ID),
                };
                self.dispatch_touch(ev);
            }

            WindowEvent::CursorMoved { .. } => {
                let ev = self.touches.pointer_moved(MOUSE_POINTER_ID);
                self.dispatch_touch(ev);
            }

            WindowEvent::RedrawRequested => {
                if !self.game.on_draw(Instant::now()) {
                    return;
                }
                if let Some(render) = self.render.as_mut() {
                    render.render(&self.game);
                }
            }

            _ => {}
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Gooon starting...");

    let game_config = GameConfig::default();
    let sheet = match load_sprite_sheet(&game_config.sprite_sheet_path) {
        Ok(sheet) => sheet,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(game_config, sheet);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
        std::process::exit(1);
    }
    if app.fatal.is_some() {
        std::process::exit(1);
    }
}
