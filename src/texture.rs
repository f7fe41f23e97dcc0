//! GPU textures with CPU-generated mip chains and sRGB reinterpretation.
//!
//! Source pixel data arrives without color-space metadata (the intermediate
//! asset representation drops it), so textures are stored as plain
//! `Rgba8Unorm` and *reinterpreted* as sRGB through a texture view over the
//! same storage: identical bytes, different decode curve, no second
//! allocation.

use crate::gpu::GpuContext;

/// An immutable GPU texture plus the sRGB view the shader samples.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    /// sRGB-decoding view over the texture's storage.
    pub(crate) view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Uploads RGBA8 pixels with a full mip chain.
    ///
    /// Mip levels are box-filtered on the CPU and uploaded in one shot; the
    /// texture is never written again.
    pub fn from_rgba8(gpu: &GpuContext, pixels: &[u8], width: u32, height: u32) -> Self {
        use wgpu::util::DeviceExt;

        let levels = mip_level_count(width, height);
        let mut data = Vec::with_capacity(pixels.len() * 4 / 3 + 4);
        data.extend_from_slice(pixels);

        let mut level_pixels = pixels.to_vec();
        let (mut level_w, mut level_h) = (width, height);
        for _ in 1..levels {
            let (next, next_w, next_h) = downsample_rgba8(&level_pixels, level_w, level_h);
            data.extend_from_slice(&next);
            level_pixels = next;
            level_w = next_w;
            level_h = next_h;
        }

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some("base color texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                // Allows the sRGB reinterpreting view below.
                view_formats: &[wgpu::TextureFormat::Rgba8UnormSrgb],
            },
            wgpu::util::TextureDataOrder::MipMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("base color srgb view"),
            format: Some(wgpu::TextureFormat::Rgba8UnormSrgb),
            ..Default::default()
        });

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// A 1×1 white texture, the fallback bound for untextured materials.
    pub fn white_pixel(gpu: &GpuContext) -> Self {
        Self::from_rgba8(gpu, &[255, 255, 255, 255], 1, 1)
    }
}

/// Number of mip levels for a full chain down to 1×1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Box-filters one RGBA8 mip level into the next. Odd dimensions clamp the
/// sampling window at the edge.
pub(crate) fn downsample_rgba8(pixels: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let next_w = (width / 2).max(1);
    let next_h = (height / 2).max(1);
    let mut out = vec![0u8; (next_w * next_h * 4) as usize];

    for y in 0..next_h {
        for x in 0..next_w {
            let x0 = (x * 2).min(width - 1);
            let y0 = (y * 2).min(height - 1);
            let x1 = (x * 2 + 1).min(width - 1);
            let y1 = (y * 2 + 1).min(height - 1);

            for channel in 0..4 {
                let sum: u32 = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
                    .iter()
                    .map(|&(sx, sy)| pixels[((sy * width + sx) * 4 + channel) as usize] as u32)
                    .sum();
                out[((y * next_w + x) * 4 + channel) as usize] = (sum / 4) as u8;
            }
        }
    }

    (out, next_w, next_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(256, 64), 9);
        assert_eq!(mip_level_count(100, 30), 7);
    }

    #[test]
    fn downsample_averages_quads() {
        // 2x2 block of grays averages to their mean.
        let pixels = [
            0, 0, 0, 255, //
            100, 100, 100, 255, //
            100, 100, 100, 255, //
            200, 200, 200, 255,
        ];
        let (out, w, h) = downsample_rgba8(&pixels, 2, 2);
        assert_eq!((w, h), (1, 1));
        assert_eq!(&out, &[100, 100, 100, 255]);
    }

    #[test]
    fn downsample_clamps_odd_dimensions() {
        // 1x1 stays 1x1 and keeps its value.
        let pixels = [10, 20, 30, 255];
        let (out, w, h) = downsample_rgba8(&pixels, 1, 1);
        assert_eq!((w, h), (1, 1));
        assert_eq!(&out, &[10, 20, 30, 255]);
    }
}
