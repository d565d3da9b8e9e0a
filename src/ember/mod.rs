use log::{debug, info};
use nalgebra::Point3;

use crate::ember::accumulator::Accumulator;
use crate::ember::camera::Camera;
use crate::ember::error::EngineError;
use crate::ember::ray::Color;
use crate::ember::rng::Lcg;
use crate::ember::scene::Scene;

pub mod accumulator;
pub mod camera;
pub mod error;
pub mod ray;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod tracer;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    // 몇 프레임에 걸쳐 누적할지. 한 프레임에 픽셀당 samples_per_pixel 개씩
    pub sample_count_target: u32,
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
    // 라디안
    pub vertical_fov: f32,
    pub near: f32,
    // 초당 이동 거리
    pub movement_speed: f32,
    // 마우스 1픽셀당 회전량 (라디안)
    pub look_sensitivity: f32,
    pub seed: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            sample_count_target: 1024,
            samples_per_pixel: 1,
            max_bounces: 4,
            vertical_fov: 45f32.to_radians(),
            near: 0.01,
            movement_speed: 10.0,
            look_sensitivity: 0.001,
            seed: 0,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::EmptyTarget {
                width: self.width,
                height: self.height,
            });
        }
        if self.sample_count_target == 0 {
            return Err(EngineError::NoSamples);
        }
        if self.samples_per_pixel == 0 {
            return Err(EngineError::NoPixelSamples);
        }
        if !(self.vertical_fov > 0.0 && self.vertical_fov < std::f32::consts::PI) {
            return Err(EngineError::InvalidFieldOfView(self.vertical_fov));
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(EngineError::InvalidNear(self.near));
        }
        if !(self.movement_speed.is_finite() && self.movement_speed >= 0.0) {
            return Err(EngineError::InvalidMovementSpeed(self.movement_speed));
        }
        if !(self.look_sensitivity.is_finite() && self.look_sensitivity >= 0.0) {
            return Err(EngineError::InvalidLookSensitivity(self.look_sensitivity));
        }

        Ok(())
    }
}

// 렌더러 전체 상태. 장면, 카메라, 누적 버퍼를 혼자 소유함
pub struct Engine {
    scene: Scene,
    camera: Camera,
    accumulator: Accumulator,
    settings: Settings,
}

impl Engine {
    pub fn new(settings: Settings) -> Result<Self, EngineError> {
        Self::with_scene(settings, Scene::default())
    }

    pub fn with_scene(settings: Settings, scene: Scene) -> Result<Self, EngineError> {
        settings.validate()?;
        scene.validate()?;

        // 원점에서 첫 번째 구(거울)를 바라보며 시작
        let position = Point3::origin();
        let target = scene
            .get(0)
            .map(|sphere| sphere.center)
            .unwrap_or_else(|| Point3::new(0.0, 0.0, 1.0));

        let camera = Camera::new(
            position,
            target,
            settings.width,
            settings.height,
            settings.vertical_fov,
            settings.near,
            settings.movement_speed,
        );
        let accumulator = Accumulator::new(
            settings.width as usize,
            settings.height as usize,
            settings.sample_count_target,
        );

        let center = camera.ray_for_pixel(settings.width as f32 / 2.0, settings.height as f32 / 2.0);
        info!(
            "engine ready: {}x{}, {} frames, {} bounces, {} spheres",
            settings.width,
            settings.height,
            settings.sample_count_target,
            settings.max_bounces,
            scene.spheres().len()
        );
        debug!("center ray direction = {:?}", center.direction.as_ref());

        Ok(Self {
            scene,
            camera,
            accumulator,
            settings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn frame_num(&self) -> u32 {
        self.accumulator.frame_num()
    }

    pub fn is_converged(&self) -> bool {
        self.accumulator.is_complete()
    }

    pub fn pixels(&self) -> &[u8] {
        self.accumulator.pixels()
    }

    // yaw, pitch 변화량 (라디안)
    pub fn on_camera_move(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.camera.look(yaw_delta, pitch_delta);
    }

    pub fn on_move_input(&mut self, forward_axis: f32, strafe_axis: f32, time_step: f32) {
        self.camera.translate(forward_axis, strafe_axis, time_step);
    }

    pub fn on_reset(&mut self) {
        self.accumulator.reset();
        debug!("accumulation reset");
    }

    pub fn set_max_bounces(&mut self, max_bounces: u32) {
        if self.settings.max_bounces == max_bounces {
            return;
        }

        self.settings.max_bounces = max_bounces;
        self.on_reset();
    }

    pub fn sample_pixel(&self, x: usize, y: usize, rng: &mut Lcg) -> Color {
        tracer::sample_pixel(
            &self.scene,
            &self.camera,
            x,
            y,
            self.settings.samples_per_pixel,
            self.settings.max_bounces,
            rng,
        )
    }

    // 한 프레임 진행. 목표 샘플 수를 다 채웠으면 기존 버퍼를 그대로 돌려줌
    pub fn render_frame(&mut self) -> &[u8] {
        self.camera.update_transform();

        let scene = &self.scene;
        let camera = &self.camera;
        let samples = self.settings.samples_per_pixel;
        let bounces = self.settings.max_bounces;

        let advanced = self.accumulator.accumulate(self.settings.seed, |x, y, rng| {
            tracer::sample_pixel(scene, camera, x, y, samples, bounces, rng)
        });

        if advanced && self.accumulator.is_complete() {
            info!(
                "sample budget reached after {} frames",
                self.accumulator.frame_num()
            );
        }

        self.accumulator.pixels()
    }
}
