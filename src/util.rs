use std::path::Path;

use image::{ColorType, ImageResult};

// RGB24 -> RGBA8. wgpu에는 3채널 텍스쳐 포맷이 없어서 알파값으로 0xFF를 대신 넣어줌
pub fn rgb_to_rgba(rgb: &[u8], rgba: &mut Vec<[u8; 4]>) {
    rgba.clear();
    rgba.extend(
        rgb.chunks_exact(3)
            .map(|pixel| [pixel[0], pixel[1], pixel[2], 0xFF]),
    );
}

pub fn frame_file_name(frame_num: u32) -> String {
    format!("ember-{frame_num:04}.png")
}

// 확장자를 보고 png나 jpeg로 저장
pub fn save_frame<P: AsRef<Path>>(path: P, width: u32, height: u32, rgb: &[u8]) -> ImageResult<()> {
    image::save_buffer(path, rgb, width, height, ColorType::Rgb8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_rgb_to_rgba() {
        let rgb = [1, 2, 3, 4, 5, 6];
        let mut rgba = vec![[9; 4]; 10];

        rgb_to_rgba(&rgb, &mut rgba);
        assert_eq!(rgba, vec![[1, 2, 3, 0xFF], [4, 5, 6, 0xFF]]);
    }

    #[test]
    fn file_names_sort_by_frame() {
        assert_eq!(frame_file_name(7), "ember-0007.png");
        assert_eq!(frame_file_name(1024), "ember-1024.png");
    }

    #[test]
    fn saved_frame_reloads() {
        let path = std::env::temp_dir().join(format!("ember-test-{}.png", std::process::id()));
        let rgb: Vec<u8> = (0..4 * 2 * 3).map(|v| (v * 10) as u8).collect();

        save_frame(&path, 4, 2, &rgb).unwrap();
        let loaded = image::open(&path).unwrap().into_rgb8();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.into_raw(), rgb);
    }
}
