use serde::{Deserialize, Serialize};

/// One generated image as produced by the host.
///
/// `data` is row-major and channel-interleaved, `width * height * channels`
/// samples nominally in `[0, 1]`. Values outside that range are clipped at
/// encode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// 1 (grayscale), 3 (RGB) or 4 (RGBA)
    pub channels: u8,
    pub data: Vec<f32>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Image filled with a single color; `color.len()` sets the channel count.
    pub fn filled(width: u32, height: u32, color: &[f32]) -> Self {
        let pixels = width as usize * height as usize;
        let data = color
            .iter()
            .copied()
            .cycle()
            .take(pixels * color.len())
            .collect();

        Self::new(width, height, color.len() as u8, data)
    }

    /// Number of samples the buffer must hold for the declared shape.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// Ordered images from one workflow execution
pub type ImageBatch = Vec<RawImage>;
