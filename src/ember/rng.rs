use rand::{Error, RngCore, SeedableRng};

// 고전적인 선형 합동 생성기 (214013, 2531011)
// 한 번 돌릴 때마다 15비트씩 뽑아냄
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    const MULTIPLIER: u32 = 214_013;
    const INCREMENT: u32 = 2_531_011;
    const RANGE: f32 = 32_768.0; // 0x7FFF + 1

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    // 픽셀 한 줄마다 독립된 난수열을 만듦.
    // 스레드끼리 생성기 하나를 같이 쓰면 데이터 레이스가 나니까 줄 단위로 쪼갬
    pub fn for_row(seed: u32, frame: u32, row: u32) -> Self {
        Self::new(mix(seed ^ mix(frame ^ mix(row))))
    }

    pub fn next_u15(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        ((self.state >> 16) & 0x7FFF) as u16
    }

    /// [0.0, 1.0) 범위의 실수
    pub fn next_f32(&mut self) -> f32 {
        self.next_u15() as f32 / Self::RANGE
    }
}

// 정수 해시. 비슷한 입력(연속된 줄 번호 등)이 전혀 다른 시드가 되도록 섞어줌
fn mix(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        // 15 + 15 + 2 비트
        let high = u32::from(self.next_u15());
        let middle = u32::from(self.next_u15());
        let low = u32::from(self.next_u15());
        (high << 17) | (middle << 2) | (low & 0b11)
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Lcg::new(1234);
        let mut b = Lcg::new(1234);

        let first: Vec<f32> = (0..256).map(|_| a.next_f32()).collect();
        let second: Vec<f32> = (0..256).map(|_| b.next_f32()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn known_first_outputs() {
        // state = 214013 * 0 + 2531011 = 2531011, >> 16 = 38
        let mut rng = Lcg::new(0);
        assert_eq!(rng.next_u15(), 38);

        let mut rng = Lcg::new(1);
        // 214013 + 2531011 = 2745024, >> 16 = 41
        assert_eq!(rng.next_u15(), 41);
    }

    #[test]
    fn floats_stay_in_unit_range() {
        let mut rng = Lcg::new(99);
        for _ in 0..100_000 {
            let value = rng.next_f32();
            assert!((0.0..1.0).contains(&value), "{value}");
        }
    }

    #[test]
    fn row_streams_differ() {
        let mut row_a = Lcg::for_row(7, 0, 0);
        let mut row_b = Lcg::for_row(7, 0, 1);
        let mut next_frame = Lcg::for_row(7, 1, 0);

        let a: Vec<u16> = (0..8).map(|_| row_a.next_u15()).collect();
        let b: Vec<u16> = (0..8).map(|_| row_b.next_u15()).collect();
        let c: Vec<u16> = (0..8).map(|_| next_frame.next_u15()).collect();

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(Lcg::for_row(7, 3, 5), Lcg::for_row(7, 3, 5));
    }

    #[test]
    fn works_with_rand_distributions() {
        let mut rng = Lcg::seed_from_u64(42);
        let mut again = Lcg::seed_from_u64(42);

        for _ in 0..1000 {
            let value: f32 = rng.gen_range(-0.5..0.5);
            let expected: f32 = again.gen_range(-0.5..0.5);
            assert!((-0.5..0.5).contains(&value));
            assert_eq!(value, expected);
        }
    }
}
