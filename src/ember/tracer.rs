use nalgebra::Vector3;

use crate::ember::camera::Camera;
use crate::ember::ray::{Color, Ray};
use crate::ember::rng::Lcg;
use crate::ember::sampling::{lambertian_bounce, random_unit_vector, reflect};
use crate::ember::scene::{HitPayload, Material, Scene};

// 위(+y)는 흰색, 아래(-y)는 어두운 빨간색. 선형 보간
pub fn sky_color(direction: &Vector3<f32>) -> Color {
    let top = Color::new(1.0, 1.0, 1.0);
    let bottom = Color::new(0.8, 0.0, 0.0);

    let light = 0.5 * (direction.y + 1.0);
    bottom.lerp(&top, light)
}

// 재귀 경로 추적. bounces_left가 0이면 검은색
pub fn trace(scene: &Scene, ray: &Ray, bounces_left: u32, rng: &mut Lcg) -> Color {
    if bounces_left == 0 {
        return Color::zeros();
    }

    let Some(HitPayload {
        position,
        normal,
        sphere,
        ..
    }) = scene.hit(ray)
    else {
        return sky_color(&ray.direction);
    };

    match sphere.material {
        Material::Mirror => {
            let direction = reflect(&ray.direction, &normal);
            trace(scene, &Ray::new(position, direction), bounces_left - 1, rng)
        }
        Material::Diffuse { albedo } => {
            let direction = lambertian_bounce(&normal, rng);
            let scattered = Ray {
                origin: position,
                direction,
            };
            trace(scene, &scattered, bounces_left - 1, rng).component_mul(&albedo)
        }
        Material::Hemisphere { albedo } => {
            let direction = random_unit_vector(&normal, rng);
            let scattered = Ray {
                origin: position,
                direction,
            };
            trace(scene, &scattered, bounces_left - 1, rng).component_mul(&albedo)
        }
    }
}

// 픽셀 하나에 대한 샘플. 픽셀 안에서 [-0.5, 0.5) 만큼 흔들어서 쏨
pub fn sample_pixel(
    scene: &Scene,
    camera: &Camera,
    x: usize,
    y: usize,
    samples: u32,
    max_bounces: u32,
    rng: &mut Lcg,
) -> Color {
    let weight = 1.0 / samples as f32;
    let mut color = Color::zeros();

    for _ in 0..samples {
        let dx = rng.next_f32() - 0.5;
        let dy = rng.next_f32() - 0.5;
        let ray = camera.ray_for_pixel(x as f32 + dx, y as f32 + dy);

        color += trace(scene, &ray, max_bounces, rng) * weight;
    }

    color
}
