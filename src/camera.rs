use nalgebra::Vector2;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::ember::Engine;

// 키보드/마우스 입력을 모아뒀다가 프레임마다 카메라 변화량으로 넘겨줌
pub struct CameraController {
    // W A S D
    inputs: [bool; 4],
    look_delta: Vector2<f32>,
    pub grab_mouse: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            inputs: [false; 4],
            look_delta: Vector2::zeros(),
            grab_mouse: false,
        }
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => self.process_key(*key, matches!(state, ElementState::Pressed)),
            WindowEvent::Focused(false) => {
                // 창을 벗어나면 떼는 이벤트가 안 올 수 있음
                self.inputs = [false; 4];
                false
            }
            _ => false,
        }
    }

    pub fn process_key(&mut self, key: VirtualKeyCode, is_press: bool) -> bool {
        match key {
            VirtualKeyCode::W => self.inputs[0] = is_press,
            VirtualKeyCode::A => self.inputs[1] = is_press,
            VirtualKeyCode::S => self.inputs[2] = is_press,
            VirtualKeyCode::D => self.inputs[3] = is_press,
            VirtualKeyCode::C if is_press => {
                self.grab_mouse = !self.grab_mouse;
            }
            _ => {
                return false;
            }
        };

        true
    }

    // 마우스를 잡고 있을 때만 시점 회전
    pub fn mouse_motion(&mut self, delta: (f64, f64)) {
        if self.grab_mouse {
            self.look_delta += Vector2::new(delta.0 as f32, delta.1 as f32);
        }
    }

    // 카메라가 움직였으면 true
    pub fn update(&mut self, engine: &mut Engine, time_step: f32) -> bool {
        let mut moved = false;

        if self.look_delta != Vector2::zeros() {
            let sensitivity = engine.settings().look_sensitivity;
            // 마우스를 아래로 내리면 아래를 봄
            engine.on_camera_move(
                self.look_delta.x * sensitivity,
                -self.look_delta.y * sensitivity,
            );
            self.look_delta = Vector2::zeros();
            moved = true;
        }

        let forward = axis(self.inputs[0], self.inputs[2]);
        let strafe = axis(self.inputs[3], self.inputs[1]);
        if forward != 0.0 || strafe != 0.0 {
            engine.on_move_input(forward, strafe, time_step);
            moved = true;
        }

        moved
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::*;
    use crate::ember::Settings;

    fn engine() -> Engine {
        Engine::new(Settings {
            width: 4,
            height: 4,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn idle_controller_does_nothing() {
        let mut engine = engine();
        let mut controller = CameraController::new();

        assert!(!controller.update(&mut engine, 0.1));
        assert_eq!(engine.camera().position, Point3::origin());
    }

    #[test]
    fn w_moves_forward_at_speed() {
        let mut engine = engine();
        let mut controller = CameraController::new();

        assert!(controller.process_key(VirtualKeyCode::W, true));
        assert!(controller.update(&mut engine, 0.5));
        assert_relative_eq!(engine.camera().position, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-5);

        controller.process_key(VirtualKeyCode::W, false);
        controller.process_key(VirtualKeyCode::S, true);
        controller.process_key(VirtualKeyCode::D, true);
        controller.update(&mut engine, 0.1);
        assert_relative_eq!(engine.camera().position, Point3::new(-1.0, 0.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn mouse_is_ignored_until_grabbed() {
        let mut engine = engine();
        let mut controller = CameraController::new();

        controller.mouse_motion((100.0, 0.0));
        assert!(!controller.update(&mut engine, 0.0));

        assert!(controller.process_key(VirtualKeyCode::C, true));
        assert!(controller.grab_mouse);
        controller.mouse_motion((100.0, -50.0));
        assert!(controller.update(&mut engine, 0.0));

        // 시작 yaw = pi/2 에서 +0.1, pitch = +0.05
        let (yaw, pitch) = (std::f32::consts::FRAC_PI_2 + 0.1, 0.05f32);
        let expected = nalgebra::Vector3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        );
        assert_relative_eq!(engine.camera().forward(), expected, epsilon = 1e-5);
    }

    #[test]
    fn unrelated_keys_are_not_handled() {
        let mut controller = CameraController::new();
        assert!(!controller.process_key(VirtualKeyCode::Q, true));
        assert!(!controller.process_key(VirtualKeyCode::C, false));
        assert!(!controller.grab_mouse);
    }
}
