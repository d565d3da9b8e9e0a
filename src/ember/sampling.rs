use nalgebra::{Reflection3, Unit, Vector3};

use crate::ember::rng::Lcg;

// 단위 구 안의 점을 균등하게 뽑음. 구 밖이면 다시 뽑기
pub fn random_in_unit_ball(rng: &mut Lcg) -> Vector3<f32> {
    loop {
        let candidate = Vector3::new(
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
        );

        // 정확히 원점이 나오면 정규화를 못 하니 그것도 다시 뽑음
        let length_squared = candidate.norm_squared();
        if length_squared <= 1.0 && length_squared > 0.0 {
            return candidate;
        }
    }
}

// normal 쪽 반구 위의 방향. 코사인 가중치 없음
pub fn random_unit_vector(normal: &Vector3<f32>, rng: &mut Lcg) -> Unit<Vector3<f32>> {
    let mut direction = random_in_unit_ball(rng).normalize();

    if direction.dot(normal) < 0.0 {
        direction = -direction;
    }

    Unit::new_unchecked(direction)
}

// 램버트 산란 근사: 단위 벡터 + 법선을 다시 정규화
pub fn lambertian_bounce(normal: &Vector3<f32>, rng: &mut Lcg) -> Unit<Vector3<f32>> {
    let direction = random_in_unit_ball(rng).normalize() + normal;

    // 뽑은 방향이 법선과 정반대면 길이가 0이 됨. 그때는 그냥 법선으로
    Unit::try_new(direction, f32::EPSILON).unwrap_or_else(|| Unit::new_normalize(*normal))
}

// v - 2 (v . n) n
pub fn reflect(incoming: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    let mut reflected = *incoming;
    Reflection3::new(Unit::new_unchecked(*normal), 0.0).reflect(&mut reflected);
    reflected
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn ball_samples_are_inside() {
        let mut rng = Lcg::new(5);
        for _ in 0..10_000 {
            let point = random_in_unit_ball(&mut rng);
            assert!(point.norm_squared() <= 1.0);
        }
    }

    #[test]
    fn hemisphere_samples_face_normal() {
        let mut rng = Lcg::new(11);
        let normal = Vector3::new(0.0, 1.0, 1.0).normalize();

        for _ in 0..10_000 {
            let direction = random_unit_vector(&normal, &mut rng);
            assert!(direction.dot(&normal) >= 0.0);
            assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn lambertian_samples_face_normal_and_lean_towards_it() {
        let mut rng = Lcg::new(23);
        let normal = Vector3::new(0.0, 0.0, -1.0);

        let mut cosine_sum = 0.0;
        let count = 20_000;
        for _ in 0..count {
            let direction = lambertian_bounce(&normal, &mut rng);
            let cosine = direction.dot(&normal);
            assert!(cosine >= -1e-6);
            assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-5);
            cosine_sum += cosine;
        }

        // 코사인 가중 분포의 평균 코사인은 2/3, 균등 반구는 1/2
        let mean = cosine_sum / count as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.03, "{mean}");
    }

    #[test]
    fn mirror_reflection() {
        let normal = Vector3::new(0.0, 1.0, 0.0);

        let reflected = reflect(&Vector3::new(1.0, -1.0, 0.0), &normal);
        assert_relative_eq!(reflected, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-6);

        let head_on = reflect(&Vector3::new(0.0, 0.0, 1.0), &Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(head_on, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }
}
