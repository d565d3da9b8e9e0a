use std::time::Instant;

use log::{error, info, warn};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowBuilder};

use crate::app::Application;
use crate::camera::CameraController;
use crate::ember::{Engine, Settings};
use crate::panel::{Panel, PanelAction, PANEL_WIDTH};

pub mod ember;
mod app;
mod camera;
mod panel;
mod texture;
mod util;

pub fn run() -> anyhow::Result<()> {
    // RUST_LOG로 출력 수준 조절
    env_logger::init();

    let settings = Settings {
        seed: rand::random(),
        ..Default::default()
    };
    let (width, height) = (settings.width, settings.height);
    let mut engine = Engine::new(settings)?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Ember: Path Tracer")
        .with_inner_size(PhysicalSize::new(width + PANEL_WIDTH, height))
        .build(&event_loop)?;

    let mut app = pollster::block_on(Application::new(window, &event_loop, width, height))?;
    let mut controller = CameraController::new();
    let mut panel = Panel::new(&engine);

    let mut last_tick = Instant::now();
    let mut title_timer = 1.0f32;

    info!("controls: WASD move, C grab mouse, Space reset, P save, Esc quit");

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            // 단축키는 egui에 포커스가 있어도 항상 먼저 처리
            if let WindowEvent::KeyboardInput { input, .. } = event {
                match shortcut(input.state, input.virtual_keycode) {
                    Some(Shortcut::Quit) => {
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    Some(Shortcut::Reset) => {
                        engine.on_reset();
                        return;
                    }
                    Some(Shortcut::Save) => {
                        save_current(&engine);
                        return;
                    }
                    None => {}
                }
            }

            // egui가 먼저 처리했으면 넘어감
            if app.input(event) {
                return;
            }

            match event {
                // 만약 앱을 운영체제에서 닫으려고 하면 나가기
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

                WindowEvent::Resized(new_size) => app.resize(*new_size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.resize(**new_inner_size)
                }

                _ => {
                    let was_grabbed = controller.grab_mouse;
                    if controller.input(event) && was_grabbed != controller.grab_mouse {
                        grab_cursor(&app.window, controller.grab_mouse);
                    }
                }
            }
        }

        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => controller.mouse_motion(delta),

        Event::RedrawRequested(window_id) if window_id == app.window.id() => {
            let now = Instant::now();
            let time_step = now.duration_since(last_tick).as_secs_f32();
            last_tick = now;

            if controller.update(&mut engine, time_step) && panel.restart_on_move {
                engine.on_reset();
            }

            let pixels = engine.render_frame();
            app.upload_frame(pixels);

            panel.fps = 1.0 / time_step.max(f32::EPSILON);
            title_timer -= time_step;
            if title_timer <= 0.0 {
                app.window.set_title(&format!(
                    "Ember: {:.0} fps, {} / {} samples",
                    panel.fps,
                    engine.frame_num(),
                    engine.settings().sample_count_target
                ));
                title_timer = 1.0;
            }

            let frame = app.frame_texture_id();
            let grabbed = controller.grab_mouse;
            let mut actions = Vec::new();
            let result = app.render(|ctx| {
                actions = panel.show(ctx, &engine, frame, grabbed);
            });

            match result {
                Ok(()) => {}
                // surface가 날아가면 다시 설정
                Err(SurfaceError::Lost | SurfaceError::Outdated) => app.resize(app.size),
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU is out of memory");
                    *control_flow = ControlFlow::Exit;
                }
                Err(error) => warn!("surface error: {error}"),
            }

            for action in actions {
                match action {
                    PanelAction::Reset => engine.on_reset(),
                    PanelAction::Save => save_current(&engine),
                    PanelAction::SetMaxBounces(bounces) => engine.set_max_bounces(bounces),
                }
            }
        }

        Event::MainEventsCleared => app.window.request_redraw(),

        _ => {}
    });
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shortcut {
    Quit,
    Reset,
    Save,
}

// 눌렀을 때만. 떼는 이벤트는 무시
fn shortcut(state: ElementState, key: Option<VirtualKeyCode>) -> Option<Shortcut> {
    if state != ElementState::Pressed {
        return None;
    }

    match key? {
        VirtualKeyCode::Escape => Some(Shortcut::Quit),
        VirtualKeyCode::Space => Some(Shortcut::Reset),
        VirtualKeyCode::P => Some(Shortcut::Save),
        _ => None,
    }
}

fn grab_cursor(window: &Window, grab: bool) {
    let result = if grab {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };

    if let Err(error) = result {
        warn!("could not change cursor grab: {error}");
    }
    window.set_cursor_visible(!grab);
}

fn save_current(engine: &Engine) {
    let path = util::frame_file_name(engine.frame_num());
    let settings = engine.settings();

    match util::save_frame(&path, settings.width, settings.height, engine.pixels()) {
        Ok(()) => info!("saved {path}"),
        Err(error) => error!("failed to save {path}: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_fire_on_press_only() {
        let pressed = ElementState::Pressed;
        let released = ElementState::Released;

        assert_eq!(shortcut(pressed, Some(VirtualKeyCode::Escape)), Some(Shortcut::Quit));
        assert_eq!(shortcut(pressed, Some(VirtualKeyCode::Space)), Some(Shortcut::Reset));
        assert_eq!(shortcut(pressed, Some(VirtualKeyCode::P)), Some(Shortcut::Save));

        assert_eq!(shortcut(released, Some(VirtualKeyCode::Space)), None);
        assert_eq!(shortcut(pressed, Some(VirtualKeyCode::W)), None);
        assert_eq!(shortcut(pressed, None), None);
    }
}
