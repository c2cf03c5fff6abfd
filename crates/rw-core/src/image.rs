use crate::{Error, PixelBuffer, Shape};

/// Rec. 601 luma weights used by [`Image::as_greyscale`].
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Dense multi-channel float image. Every pixel is defined; validity masking
/// lives in [`crate::MaskedImage`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    buf: PixelBuffer<f32>,
}

impl Image {
    /// Blank factory: all channels of all pixels equal `fill`.
    pub fn init_blank(shape: impl Into<Shape>, n_channels: usize, fill: f32) -> Self {
        Self {
            buf: PixelBuffer::new_fill(shape, n_channels, fill),
        }
    }

    pub fn from_vec(
        shape: impl Into<Shape>,
        n_channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        Ok(Self {
            buf: PixelBuffer::from_vec(shape, n_channels, data)?,
        })
    }

    pub fn shape(&self) -> &Shape {
        self.buf.shape()
    }

    pub fn n_dims(&self) -> usize {
        self.buf.n_dims()
    }

    pub fn n_channels(&self) -> usize {
        self.buf.n_channels()
    }

    pub fn n_pixels(&self) -> usize {
        self.buf.shape().n_pixels()
    }

    /// Flat interleaved storage, for bulk arithmetic and display consumers.
    pub fn pixels(&self) -> &[f32] {
        self.buf.data()
    }

    pub fn pixels_mut(&mut self) -> &mut [f32] {
        self.buf.data_mut()
    }

    pub fn buffer(&self) -> &PixelBuffer<f32> {
        &self.buf
    }

    pub fn get(&self, index: &[usize], channel: usize) -> Result<f32, Error> {
        self.buf.get(index, channel)
    }

    pub fn set(&mut self, index: &[usize], channel: usize, value: f32) -> Result<(), Error> {
        self.buf.set(index, channel, value)
    }

    /// Copies the spatial region `[min_corner, max_corner)`, all channels.
    pub fn crop(&self, min_corner: &[usize], max_corner: &[usize]) -> Result<Self, Error> {
        Ok(Self {
            buf: self.buf.crop(min_corner, max_corner)?,
        })
    }

    /// Collapses a 3-channel image to one channel with Rec. 601 luma weights.
    pub fn as_greyscale(&self) -> Result<Self, Error> {
        if self.n_channels() != 3 {
            return Err(Error::UnsupportedChannels {
                expected: 3,
                actual: self.n_channels(),
            });
        }

        let mut out = Vec::with_capacity(self.n_pixels());
        for px in self.pixels().chunks_exact(3) {
            out.push(
                LUMA_WEIGHTS[0] * px[0] + LUMA_WEIGHTS[1] * px[1] + LUMA_WEIGHTS[2] * px[2],
            );
        }
        Self::from_vec(self.shape().clone(), 1, out)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::Image;
    use crate::Error;

    #[test]
    fn init_blank_fills_all_channels() {
        let img = Image::init_blank([2, 3], 2, 1.5);

        assert_eq!(img.shape().dims(), &[2, 3]);
        assert_eq!(img.n_channels(), 2);
        assert!(img.pixels().iter().all(|&v| v == 1.5));
    }

    #[test]
    fn crop_matches_manual_region() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let img = Image::from_vec([3, 4], 1, data).expect("valid image");

        let sub = img.crop(&[1, 1], &[3, 3]).expect("valid region");
        assert_eq!(sub.shape().dims(), &[2, 2]);
        assert_eq!(sub.pixels(), &[5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn greyscale_applies_luma_weights() {
        let img = Image::from_vec([1, 2], 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .expect("valid image");

        let grey = img.as_greyscale().expect("3 channels");
        assert_eq!(grey.n_channels(), 1);
        assert_relative_eq!(grey.pixels()[0], 0.299);
        assert_relative_eq!(grey.pixels()[1], 0.587);
    }

    #[test]
    fn greyscale_weights_preserve_uniform_grey() {
        let img = Image::init_blank([2, 2], 3, 0.25);
        let grey = img.as_greyscale().expect("3 channels");
        for &v in grey.pixels() {
            assert_relative_eq!(v, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn greyscale_rejects_other_channel_counts() {
        let img = Image::init_blank([2, 2], 2, 0.0);
        assert_eq!(
            img.as_greyscale().unwrap_err(),
            Error::UnsupportedChannels {
                expected: 3,
                actual: 2
            }
        );
    }
}
