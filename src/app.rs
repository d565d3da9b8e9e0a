use std::iter;

use anyhow::Context as _;
use eframe::egui::{ClippedPrimitive, Context, TextureId};
use wgpu::{
    Backends, Color, CommandBuffer, CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode,
    Device, DeviceDescriptor, Dx12Compiler, Features, FilterMode, Instance, InstanceDescriptor,
    Limits, LoadOp, Operations, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceError,
    TextureUsages, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::texture::FrameTexture;

// GPU 장치, 화면 surface, egui를 묶어서 관리
pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    // 무조건 winit의 Window를 쓸 것!
    pub window: Window,
    egui_state: egui_winit::State,
    egui_context: Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,
    frame: FrameTexture,
    frame_id: TextureId,
}

impl Application {
    pub async fn new(
        window: Window,
        event_loop: &EventLoop<()>,
        frame_width: u32,
        frame_height: u32,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // 아무 백엔드나 상관 없는 instance 요청
        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // 전달하는 &window가 생성하는 surface보다 오래 유지되어야 함.
        // window는 아래에서 Application 안으로 옮겨지니 괜찮음
        let surface = unsafe { instance.create_surface(&window) }
            .context("failed to create a window surface")?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    limits: Limits::default(),
                    label: Some("Ember GPU"),
                },
                None,
            )
            .await
            .context("failed to open the GPU device")?;

        let capabilities = surface.get_capabilities(&adapter);

        // sRGB 포맷 우선
        let surface_format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first())
            .copied()
            .context("the surface reports no texture formats")?;
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let mut egui_state = egui_winit::State::new(event_loop);
        egui_state.set_pixels_per_point(window.scale_factor() as f32);
        let egui_context = Context::default();

        let mut egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            None, // 깊이 안씀
            1,    // 멀티 샘플링 1번만 할꺼임
        );
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        // 렌더링 결과는 egui 이미지로 그림. 픽셀이 보이도록 Nearest
        let frame = FrameTexture::new(&device, frame_width, frame_height, "Ember Output");
        let frame_id = egui_renderer.register_native_texture(&device, &frame.view, FilterMode::Nearest);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
            frame,
            frame_id,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    pub fn frame_texture_id(&self) -> TextureId {
        self.frame_id
    }

    pub fn upload_frame(&mut self, rgb: &[u8]) {
        self.frame.upload_rgb(&self.queue, rgb);
    }

    pub fn render(&mut self, build_ui: impl FnOnce(&Context)) -> Result<(), SurfaceError> {
        let output = self.surface.get_current_texture()?; // 렌더링 결과를 출력할 곳

        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        let (primitives, freed, ui_commands) = self.update_egui(&mut encoder, build_ui);

        // render_pass가 encoder를 빌려오기 때문에 블록으로 감쌈
        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            self.egui_renderer
                .render(&mut render_pass, &primitives, &self.egui_screen);
        }

        self.queue
            .submit(ui_commands.into_iter().chain(iter::once(encoder.finish())));
        output.present();

        // 다 그린 다음에 지워야 함
        for id in &freed {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }

    // true: egui가 입력을 가져감, false: 아래 event loop에서 처리 해야 함.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_event(&self.egui_context, event).consumed
    }

    fn update_egui(
        &mut self,
        encoder: &mut CommandEncoder,
        build_ui: impl FnOnce(&Context),
    ) -> (Vec<ClippedPrimitive>, Vec<TextureId>, Vec<CommandBuffer>) {
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let egui_output = self.egui_context.run(egui_input, build_ui);

        self.egui_state.handle_platform_output(
            &self.window,
            &self.egui_context,
            egui_output.platform_output,
        );
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        for (id, delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        let commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &primitives,
            &self.egui_screen,
        );

        (primitives, egui_output.textures_delta.free, commands)
    }
}
