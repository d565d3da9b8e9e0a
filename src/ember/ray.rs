use nalgebra::{Point3, Unit, Vector3};

pub type Color = Vector3<f32>;

// 방향은 언제나 단위 벡터. 반사/산란 직후에도 다시 정규화해서 넣을 것
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction.as_ref() * distance
    }
}
