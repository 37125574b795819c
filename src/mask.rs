// src/mask.rs
//
// Single-channel 8-bit image used between pipeline stages.
// A sample counts as "set" when it is non-zero.

use image::{imageops, GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    pub const ON: u8 = 255;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: GrayImage::new(width as u32, height as u32),
        }
    }

    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.image.get_pixel(x as u32, y as u32)[0]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.image.put_pixel(x as u32, y as u32, Luma([value]));
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != 0
    }

    pub fn count_set(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v != 0).count()
    }

    /// Copy out a sub-rectangle, clipped to the mask.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Mask {
        let view = imageops::crop_imm(&self.image, x as u32, y as u32, width as u32, height as u32);
        Mask::from_image(view.to_image())
    }

    /// Fill an axis-aligned rectangle (clipped) with `value`.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, value: u8) {
        if width == 0 || height == 0 {
            return;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(width as u32, height as u32);
        draw_filled_rect_mut(&mut self.image, rect, Luma([value]));
    }
}
