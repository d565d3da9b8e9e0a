use rayon::prelude::*;

use crate::ember::ray::Color;
use crate::ember::rng::Lcg;

pub const CHANNELS: usize = 3;

// 점진적 렌더링 버퍼.
// sums는 채널별 누적값, pixels는 거기서 뽑은 화면용 RGB24
pub struct Accumulator {
    width: usize,
    sums: Vec<f32>,
    pixels: Vec<u8>,
    frame_num: u32,
    sample_count_target: u32,
    sample_weight: f32,
}

impl Accumulator {
    pub fn new(width: usize, height: usize, sample_count_target: u32) -> Self {
        let len = width * height * CHANNELS;

        Self {
            width,
            sums: vec![0.0; len],
            pixels: vec![0; len],
            frame_num: 0,
            sample_count_target,
            sample_weight: 1.0 / sample_count_target as f32,
        }
    }

    pub fn frame_num(&self) -> u32 {
        self.frame_num
    }

    pub fn sums(&self) -> &[f32] {
        &self.sums
    }

    // 한 줄에 width * 3 바이트, 위에서 아래로
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_complete(&self) -> bool {
        self.frame_num >= self.sample_count_target
    }

    pub fn reset(&mut self) {
        self.sums.fill(0.0);
        self.pixels.fill(0);
        self.frame_num = 0;
    }

    // 모든 픽셀에 샘플 하나씩 더함. 이미 목표치에 도달했으면 아무것도 안 하고 false.
    // 줄마다 따로 난수열을 쓰기 때문에 스레드 배치와 무관하게 결과가 같음
    pub fn accumulate<F>(&mut self, seed: u32, sample: F) -> bool
    where
        F: Fn(usize, usize, &mut Lcg) -> Color + Sync,
    {
        if self.is_complete() {
            return false;
        }

        let stride = self.width * CHANNELS;
        let weight = self.sample_weight;
        let frame = self.frame_num;

        self.sums
            .par_chunks_mut(stride)
            .zip(self.pixels.par_chunks_mut(stride))
            .enumerate()
            .for_each(|(y, (sum_row, pixel_row))| {
                let mut rng = Lcg::for_row(seed, frame, y as u32);

                let cells = sum_row
                    .chunks_exact_mut(CHANNELS)
                    .zip(pixel_row.chunks_exact_mut(CHANNELS));
                for (x, (sum, pixel)) in cells.enumerate() {
                    let color = sample(x, y, &mut rng);

                    for channel in 0..CHANNELS {
                        sum[channel] += weight * color[channel];
                        pixel[channel] = to_byte(sum[channel]);
                    }
                }
            });

        self.frame_num += 1;
        true
    }
}

// 반올림 없이 버림. 1.0을 넘는 값은 255에서 멈춤 (as 캐스팅은 포화됨)
pub fn to_byte(value: f32) -> u8 {
    (value * 255.0) as u8
}
