use std::f32::consts::FRAC_PI_2;

use log::warn;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::ember::ray::Ray;

// 수직 방향을 완전히 보면 look-at 기저가 무너짐
const PITCH_LIMIT: f32 = 89.0 * (FRAC_PI_2 / 90.0);

pub struct Camera {
    pub position: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    yaw: f32,
    pitch: f32,

    view: Matrix4<f32>,
    inverse_view: Matrix4<f32>,
    // 역행렬의 회전 부분만. 방향 벡터는 이동시키지 않음
    inverse_view3: Matrix3<f32>,

    focal_scale: f32,
    near: f32,
    half_width: f32,
    half_height: f32,

    movement_speed: f32,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        width: u32,
        height: u32,
        vertical_fov: f32,
        near: f32,
        movement_speed: f32,
    ) -> Self {
        let half_width = width as f32 * 0.5;
        let half_height = height as f32 * 0.5;

        // 가로, 세로 모두 세로 기준 화각으로 같은 비율을 씀
        let focal_scale = near * (vertical_fov / 2.0).tan() / half_height;

        let forward = (target - position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);
        let raw_pitch = forward.y.clamp(-1.0, 1.0).asin();
        let pitch = raw_pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let yaw = forward.z.atan2(forward.x);

        // 바로 위나 아래를 보고 시작하면 제한된 각도로 다시 계산
        let forward = if pitch == raw_pitch {
            forward
        } else {
            direction(yaw, pitch)
        };

        let mut to_return = Self {
            position,
            forward,
            right: Vector3::zeros(),
            yaw,
            pitch,
            view: Matrix4::identity(),
            inverse_view: Matrix4::identity(),
            inverse_view3: Matrix3::identity(),
            focal_scale,
            near,
            half_width,
            half_height,
            movement_speed,
        };

        to_return.reevaluate_right();
        to_return.update_transform();

        to_return
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn inverse_view(&self) -> &Matrix4<f32> {
        &self.inverse_view
    }

    // yaw, pitch는 라디안
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.forward = direction(self.yaw, self.pitch);
        self.reevaluate_right();
    }

    // forward_axis, strafe_axis는 -1 ~ 1, time_step은 초 단위
    pub fn translate(&mut self, forward_axis: f32, strafe_axis: f32, time_step: f32) {
        let step = self.movement_speed * time_step;
        self.position += self.forward * (forward_axis * step);
        self.position += self.right * (strafe_axis * step);
    }

    // 매 프레임 광선을 만들기 전에 한 번 호출
    pub fn update_transform(&mut self) {
        let target = self.position + self.forward;
        let view = Matrix4::look_at_rh(&self.position, &target, &Vector3::y());

        let Some(inverse_view) = view.try_inverse() else {
            warn!("camera view matrix is not invertible, keeping the previous transform");
            return;
        };

        self.view = view;
        self.inverse_view = inverse_view;
        self.inverse_view3 = inverse_view.fixed_view::<3, 3>(0, 0).into_owned();
    }

    // 픽셀 좌표(소수 가능) -> 월드 공간 광선. 핀홀 카메라 모델
    pub fn ray_for_pixel(&self, x: f32, y: f32) -> Ray {
        let local = Vector3::new(
            (x - self.half_width) * self.focal_scale,
            -(y - self.half_height) * self.focal_scale,
            -self.near,
        )
        .normalize();

        Ray::new(self.position, self.inverse_view3 * local)
    }

    fn reevaluate_right(&mut self) {
        self.right = self.forward.cross(&Vector3::y());
    }
}

fn direction(yaw: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        pitch.cos() * yaw.cos(),
        pitch.sin(),
        pitch.cos() * yaw.sin(),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn camera() -> Camera {
        Camera::new(
            Point3::origin(),
            Point3::new(0.0, 0.0, 15.0),
            512,
            512,
            45f32.to_radians(),
            0.01,
            10.0,
        )
    }

    #[test]
    fn centre_pixel_looks_forward() {
        let camera = camera();
        let ray = camera.ray_for_pixel(256.0, 256.0);

        assert_eq!(ray.origin, Point3::origin());
        assert_relative_eq!(ray.direction.into_inner(), Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn top_edge_matches_half_fov() {
        let camera = camera();
        let ray = camera.ray_for_pixel(256.0, 0.0);

        // 위쪽 끝 픽셀은 정확히 화각의 절반만큼 위를 봄
        let angle = ray.direction.y.atan2(ray.direction.z);
        assert_relative_eq!(angle, 22.5f32.to_radians(), epsilon = 1e-4);
    }

    #[test]
    fn screen_axes_map_to_world() {
        let camera = camera();

        // 화면 오른쪽 = 카메라 right 방향
        let right = camera.ray_for_pixel(511.0, 256.0);
        assert!(right.direction.dot(&camera.right()) > 0.0);

        // 화면 아래쪽 = y 감소
        let bottom = camera.ray_for_pixel(256.0, 511.0);
        assert!(bottom.direction.y < 0.0);
    }

    #[test]
    fn look_follows_yaw_pitch_formula() {
        let mut camera = camera();
        // 처음 방향은 +z, 즉 yaw = pi/2
        camera.look(-FRAC_PI_2, 0.3);

        let expected = Vector3::new(0.3f32.cos(), 0.3f32.sin(), 0.0);
        assert_relative_eq!(camera.forward(), expected, epsilon = 1e-5);
        assert_relative_eq!(camera.right(), expected.cross(&Vector3::y()), epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.look(0.0, 10.0);
        camera.update_transform();

        assert!(camera.forward().y < 1.0);
        let ray = camera.ray_for_pixel(256.0, 256.0);
        assert!(ray.direction.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn looking_straight_down_is_clamped() {
        let camera = Camera::new(
            Point3::origin(),
            Point3::new(0.0, -10.0, 0.0),
            64,
            64,
            45f32.to_radians(),
            0.01,
            10.0,
        );

        assert!(camera.forward().y < 0.0 && camera.forward().y > -1.0);
        let ray = camera.ray_for_pixel(32.0, 32.0);
        assert!(ray.direction.iter().all(|c| c.is_finite()));
        assert!(ray.direction.y < -0.99);
    }

    #[test]
    fn translate_moves_along_forward_and_right() {
        let mut camera = camera();
        camera.translate(1.0, 0.0, 0.5);
        assert_relative_eq!(camera.position, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-5);

        // forward = +z 일 때 right = z x y = -x
        camera.translate(0.0, 1.0, 0.1);
        assert_relative_eq!(camera.position, Point3::new(-1.0, 0.0, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn transform_follows_position() {
        let mut camera = camera();
        camera.translate(-1.0, 0.0, 1.0);
        camera.update_transform();

        let eye = camera.inverse_view() * nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(eye.xyz(), Vector3::new(0.0, 0.0, -10.0), epsilon = 1e-4);
        assert_relative_eq!(
            camera.view() * camera.inverse_view(),
            Matrix4::identity(),
            epsilon = 1e-5
        );
    }
}
