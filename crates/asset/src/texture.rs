//! Texture loading and data structures.
//! RGBA8 textures decoded from PNG or DDS files.

use std::path::Path;

use anyhow::Context;

/// RGBA8 texel data ready for GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Byte length of a `width` x `height` RGBA8 image, `None` on overflow.
pub fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

impl TextureData {
    /// Wrap RGBA8 texels, rejecting empty images and mismatched buffers.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = rgba8_len(width, height)
            .with_context(|| format!("Texture size {width}x{height} overflows"))?;
        anyhow::ensure!(width > 0 && height > 0, "Texture is empty ({width}x{height})");
        anyhow::ensure!(
            data.len() == expected,
            "Texture data is {} bytes, expected {} for {}x{} RGBA8",
            data.len(),
            expected,
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Decode a PNG or DDS file; the format is picked from the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());

        Self::new_rgba8(width, height, data)
            .with_context(|| format!("Invalid texture {:?}", path))
    }

    /// Like [`TextureData::load`], but falls back to a checkerboard and logs
    /// a warning when the file is missing or cannot be decoded.
    pub fn load_or_checkerboard<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(tex) => tex,
            Err(err) => {
                log::warn!("{:#}; using checkerboard instead", err);
                Self::checkerboard(64)
            }
        }
    }

    /// White/gray checkerboard with 8-pixel cells.
    pub fn checkerboard(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity(rgba8_len(size, size).unwrap_or(0));

        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// 1x1 white texel, bound for meshes drawn with vertex colors only.
    pub fn white() -> Self {
        Self {
            data: vec![255; 4],
            width: 1,
            height: 1,
        }
    }

    /// Dimensions are non-zero and the buffer holds exactly one RGBA8 image.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && rgba8_len(self.width, self.height) == Some(self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let tex = TextureData::checkerboard(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[255, 255, 255, 255]);
        let second_cell = (8 * 4) as usize;
        assert_eq!(&tex.data[second_cell..second_cell + 4], &[128, 128, 128, 255]);
    }

    #[test]
    fn missing_file_falls_back() {
        let tex = TextureData::load_or_checkerboard("no/such/texture.dds");
        assert!(tex.is_valid());
        assert_eq!(tex.width, 64);
    }

    #[test]
    fn white_is_one_texel() {
        let tex = TextureData::white();
        assert!(tex.is_valid());
        assert_eq!(tex.data, vec![255; 4]);
    }

    #[test]
    fn mismatched_buffer_is_an_error() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::new_rgba8(0, 4, Vec::new()).is_err());
        let ok = TextureData::new_rgba8(2, 2, vec![0; 16]).expect("2x2 texture");
        assert!(ok.is_valid());
    }

    #[test]
    fn huge_dimensions_do_not_overflow() {
        assert_eq!(rgba8_len(u32::MAX, u32::MAX), None);
        assert!(TextureData::new_rgba8(u32::MAX, u32::MAX, vec![0; 4]).is_err());
        assert!(TextureData::new_rgba8(65_536, 65_536, vec![0; 4]).is_err());
    }
}
