//! Sampled 2D textures loaded from image files.
//!
//! Color maps are uploaded as `Rgba8UnormSrgb`; data maps such as the
//! specular mask stay linear. A 1×1 placeholder stands in for optional maps
//! that fail to load.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// How texel values are interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color imagery; decoded to linear on sample.
    Srgb,
    /// Masks and other data sampled as stored.
    Linear,
}

impl ColorSpace {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A texture and its default view.
pub struct Texture2d {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
}

impl Texture2d {
    /// Decode `path` and upload it as RGBA8.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        color_space: ColorSpace,
    ) -> Result<Self, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("texture");

        let texture = Self::from_rgba8(
            device,
            queue,
            label,
            image.as_raw(),
            width,
            height,
            color_space,
        )?;
        log::info!("Loaded texture {} ({width}x{height})", path.display());
        Ok(texture)
    }

    /// Load `path`, or fall back to a 1×1 texture of `fallback` when it fails.
    pub fn load_or_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        color_space: ColorSpace,
        fallback: [u8; 4],
    ) -> Self {
        match Self::load(device, queue, path, color_space) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{err}; using a placeholder");
                Self::placeholder(device, queue, color_space, fallback)
            }
        }
    }

    /// 1×1 texture of a single color.
    pub fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_space: ColorSpace,
        rgba: [u8; 4],
    ) -> Self {
        let texture = create_texture(device, "placeholder", 1, 1, color_space.format());
        upload(queue, &texture, &rgba, 1, 1);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            dimensions: (1, 1),
        }
    }

    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[u8],
        width: u32,
        height: u32,
        color_space: ColorSpace,
    ) -> Result<Self, TextureError> {
        validate_dimensions(width, height, device.limits().max_texture_dimension_2d)?;
        validate_data_size(data, width, height)?;

        let texture = create_texture(device, label, width, height, color_space.format());
        upload(queue, &texture, data, width, height);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            dimensions: (width, height),
        })
    }
}

/// Linear filtering; wraps around longitude and clamps at the poles.
pub fn create_surface_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sampler-linear"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn upload(queue: &wgpu::Queue, texture: &wgpu::Texture, data: &[u8], width: u32, height: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * BYTES_PER_TEXEL),
            rows_per_image: None,
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

const BYTES_PER_TEXEL: u32 = 4;

fn validate_dimensions(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

fn validate_data_size(data: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    let expected = width as usize * height as usize * BYTES_PER_TEXEL as usize;
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                ..Default::default()
            })
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(8192, 4096, 8192).is_ok());
        assert!(matches!(
            validate_dimensions(0, 4, 8192),
            Err(TextureError::ZeroDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            validate_dimensions(16_384, 8192, 8192),
            Err(TextureError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_data_size() {
        assert!(validate_data_size(&[0u8; 64], 4, 4).is_ok());
        let err = validate_data_size(&[0u8; 60], 4, 4).unwrap_err();
        assert!(matches!(
            err,
            TextureError::DataSizeMismatch {
                actual: 60,
                expected: 64,
                ..
            }
        ));
    }

    #[test]
    fn test_color_space_formats() {
        assert_eq!(ColorSpace::Srgb.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(ColorSpace::Linear.format(), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let path = Path::new("does/not/exist.png");
        let result = Texture2d::load(&device, &queue, path, ColorSpace::Srgb);
        match result {
            Err(TextureError::ImageLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ImageLoad, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_placeholder_is_one_texel() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let texture = Texture2d::load_or_placeholder(
            &device,
            &queue,
            Path::new("missing_clouds.jpg"),
            ColorSpace::Srgb,
            [0, 0, 0, 0],
        );
        assert_eq!(texture.dimensions, (1, 1));
    }

    #[test]
    fn test_from_rgba8_uploads() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let texture =
            Texture2d::from_rgba8(&device, &queue, "t", &[255u8; 16], 2, 2, ColorSpace::Linear)
                .unwrap();
        assert_eq!(texture.dimensions, (2, 2));
        assert_eq!(texture.texture.format(), wgpu::TextureFormat::Rgba8Unorm);
    }
}
