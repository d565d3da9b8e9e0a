use bytemuck::cast_slice;
use log::warn;
use wgpu::{
    Device, Extent3d, ImageCopyTexture, ImageDataLayout, Origin3d, Queue, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

use crate::util::rgb_to_rgba;

// 렌더러가 만든 RGB24 버퍼를 매 프레임 올려두는 GPU 텍스쳐
pub struct FrameTexture {
    pub gpu_texture: Texture,
    pub view: TextureView,
    pub name: String,
    staging: Vec<[u8; 4]>,
}

impl FrameTexture {
    pub fn new(device: &Device, width: u32, height: u32, label: &str) -> FrameTexture {
        let gpu_texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1, // 이미지의 레이어 갯수. 단순한 2차원 이미지니 1개로
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,

            // Texture Binding: egui에서 그릴 예정
            // Copy destination: CPU에서 GPU로 데이터가 복사될 예정
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = gpu_texture.create_view(&TextureViewDescriptor {
            label: Some(&format!("{} view", label)),
            ..Default::default() // label 뺴고 나머진 기본값 그대로
        });

        Self {
            gpu_texture,
            view,
            name: label.to_string(),
            staging: Vec::with_capacity((width * height) as usize),
        }
    }

    pub fn upload_rgb(&mut self, queue: &Queue, rgb: &[u8]) {
        let pixel_count = {
            let size = self.gpu_texture.size();
            size.width * size.height
        } as usize;
        if pixel_count != rgb.len() / 3 {
            warn!(
                "{}: expected {} pixels, got {}, skipping upload",
                self.name,
                pixel_count,
                rgb.len() / 3
            );
            return;
        }

        rgb_to_rgba(rgb, &mut self.staging);

        queue.write_texture(
            ImageCopyTexture {
                texture: &self.gpu_texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            cast_slice(self.staging.as_slice()),
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.gpu_texture.width()),
                rows_per_image: Some(self.gpu_texture.height()),
            },
            self.gpu_texture.size(),
        )
    }
}
