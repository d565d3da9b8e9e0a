use nalgebra::{Point3, Vector3};

use crate::ember::error::EngineError;
use crate::ember::ray::{Color, Ray};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    // 완벽한 거울. 에너지 손실 없음
    Mirror,
    // 램버트 반사 (코사인 가중치 근사)
    Diffuse { albedo: Color },
    // 반구 위 균등 산란. 코사인 항을 따로 곱하지 않아서 밝기가 정확하진 않음
    Hemisphere { albedo: Color },
}

impl Material {
    pub fn diffuse(albedo: f32) -> Self {
        Material::Diffuse {
            albedo: Color::repeat(albedo),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    // 반지름이 0이면 법선 계산에서 0으로 나누게 되니 아예 만들지 않음
    pub fn new(center: Point3<f32>, radius: f32, material: Material) -> Result<Self, EngineError> {
        if !valid_radius(radius) {
            return Err(EngineError::InvalidRadius(radius));
        }

        Ok(Self {
            center,
            radius,
            material,
        })
    }

    // |o + t*d - c|^2 = r^2 를 t에 대해 풀고 작은 근을 돌려줌.
    // 판별식이 0 이하(접하는 경우 포함)면 안 맞은 걸로 침.
    // 근이 0 이하일 수도 있음. 그건 부르는 쪽에서 걸러야 함
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let origin = ray.origin - self.center;

        let a = ray.direction.norm_squared();
        let b = 2.0 * origin.dot(ray.direction.as_ref());
        let c = origin.norm_squared() - self.radius * self.radius;

        // 판별식
        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 {
            return None;
        }

        Some((-b - discriminant.sqrt()) / (2.0 * a))
    }

    // 반지름으로 나누는 것 자체가 정규화
    pub fn normal_at(&self, point: &Point3<f32>) -> Vector3<f32> {
        (point - self.center) / self.radius
    }
}

fn valid_radius(radius: f32) -> bool {
    radius.is_finite() && radius > 0.0
}

pub struct HitPayload<'a> {
    pub index: usize,
    pub distance: f32,
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub sphere: &'a Sphere,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    // 필드가 공개라 Sphere::new를 거치지 않은 구가 들어올 수 있음
    pub fn validate(&self) -> Result<(), EngineError> {
        match self
            .spheres
            .iter()
            .find(|sphere| !valid_radius(sphere.radius))
        {
            Some(sphere) => Err(EngineError::InvalidRadius(sphere.radius)),
            None => Ok(()),
        }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn get(&self, index: usize) -> Option<&Sphere> {
        self.spheres.get(index)
    }

    // 전부 다 검사. 거리가 같으면 먼저 나온(인덱스가 작은) 구가 이김
    pub fn find_closest(&self, ray: &Ray) -> Option<(usize, f32)> {
        let mut closest: Option<(usize, f32)> = None;

        for (index, sphere) in self.spheres.iter().enumerate() {
            let Some(distance) = sphere.intersect(ray) else {
                continue;
            };

            // 광선 시작점 뒤쪽
            if distance <= 0.0 {
                continue;
            }

            match closest {
                Some((_, best)) if distance >= best => {}
                _ => closest = Some((index, distance)),
            }
        }

        closest
    }

    pub fn hit(&self, ray: &Ray) -> Option<HitPayload<'_>> {
        let (index, distance) = self.find_closest(ray)?;
        let sphere = &self.spheres[index];

        let position = ray.at(distance);
        let normal = sphere.normal_at(&position);

        Some(HitPayload {
            index,
            distance,
            position,
            normal,
            sphere,
        })
    }
}

impl Default for Scene {
    // 가운데 거울 구, 아래에 아주 큰 바닥 구, 옆에 작은 구
    fn default() -> Self {
        Self::new(vec![
            Sphere {
                center: Point3::new(0.0, 0.0, 15.0),
                radius: 5.0,
                material: Material::Mirror,
            },
            Sphere {
                center: Point3::new(0.0, -105.0, 10.0),
                radius: 100.0,
                material: Material::diffuse(0.8),
            },
            Sphere {
                center: Point3::new(8.0, -3.0, 10.0),
                radius: 2.0,
                material: Material::diffuse(0.8),
            },
        ])
    }
}
