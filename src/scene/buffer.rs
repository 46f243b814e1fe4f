use image::RgbaImage;
use nalgebra::Vector3;

use super::raster::Fragment;

/// Struct, representing raw rgba8 pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0,   g: 0,   b: 0,   a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b, a: 255 };
    }

    /// Color from float rgb in [0.0, 1.0], out of range channels are clamped.
    pub fn from_rgb(rgb: Vector3<f32>) -> Color {
        fn to_channel(value: f32) -> u8 {
            // NaN ends up as 0 after the cast.
            return (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        return Color {
            r: to_channel(rgb.x),
            g: to_channel(rgb.y),
            b: to_channel(rgb.z),
            a: 255,
        };
    }

    pub fn to_rgb(self) -> Vector3<f32> {
        return Vector3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0;
    }

    /// Scales rgb by a light intensity, keeping alpha.
    pub fn scaled(self, intensity: f32) -> Color {
        let mut color = Color::from_rgb(self.to_rgb() * intensity);
        color.a = self.a;
        return color;
    }
}

/// Frame buffer and z-buffer of a single render target.
/// Only place, where pixels and depth values get mutated, all writes go through the depth test
/// in `submit`.
/// (0, 0) is the bottom left coordinate.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    background: Color,
    z_buffer: Vec<f32>,   // Nearest depth seen so far at every pixel, reset by clear().
    depth_data: Vec<u8>,  // Normalized values of the z-buffer for visualization.
    render_data: Vec<u8>, // Storing flat rgba8 array, rows from top to bottom.
}

impl Framebuffer {
    /// Depth value of a cell, that nothing has been drawn to.
    pub const CLEAR_DEPTH: f32 = f32::INFINITY;

    pub fn new(width: u32, height: u32, background: Color) -> Framebuffer {
        let n_pixels = (width * height) as usize;
        let mut framebuffer = Framebuffer {
            width,
            height,
            background,
            z_buffer: vec![Self::CLEAR_DEPTH; n_pixels],
            depth_data: vec![0; 4 * n_pixels],
            render_data: vec![0; 4 * n_pixels],
        };
        framebuffer.clear();
        return framebuffer;
    }

    /// Get rendered frame as a slice of rgba values of size 4 * (number of pixels).
    pub fn as_render_data(&self) -> &[u8] {
        return &self.render_data[..];
    }

    /// Get image, representing z-buffer values, near is bright.
    /// Lazy in a sense, that color data for the image is calculated only if this call is made.
    pub fn as_depth_data(&mut self) -> &[u8] {
        let finite = self.z_buffer.iter().copied().filter(|z| z.is_finite());
        let (z_min, z_max) = finite.fold((f32::MAX, f32::MIN), |(lo, hi), z| (lo.min(z), hi.max(z)));
        let scale = (z_max - z_min).max(f32::EPSILON);
        for y in 0..self.height {
            for x in 0..self.width {
                let z = self.z_buffer[self.depth_index(x, y)];
                let value = match z.is_finite() {
                    true => (255.0 * (1.0 - (z - z_min) / scale)) as u8,
                    false => 0,
                };
                let index = self.pixel_index(x, y);
                self.depth_data[index..index + 3].fill(value);
                self.depth_data[index + 3] = 255;
            }
        }
        return &self.depth_data[..];
    }

    /// Resets z-buffer to the clear depth and all pixels to the background color.
    pub fn clear(&mut self) {
        self.z_buffer.fill(Self::CLEAR_DEPTH);
        let background = [self.background.r, self.background.g, self.background.b, self.background.a];
        for pixel in self.render_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&background);
        }
    }

    fn depth_index(&self, x: u32, y: u32) -> usize {
        return (x + y * self.width) as usize;
    }

    /// Index of the first byte of a pixel, forcing (0, 0) to be in the bottom left by inverting y.
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        return 4 * (x + (self.height - 1 - y) * self.width) as usize;
    }

    /// Depth test and write. Returns true if the fragment made it into the frame.
    /// Strict comparison, so on equal depth the fragment submitted first stays.
    pub fn submit(&mut self, fragment: &Fragment) -> bool {
        if fragment.x >= self.width || fragment.y >= self.height || !fragment.depth.is_finite() {
            return false;
        }
        let index = self.depth_index(fragment.x, fragment.y);
        if fragment.depth >= self.z_buffer[index] {
            return false;
        }
        self.z_buffer[index] = fragment.depth;
        self.set_pixel(fragment.x, fragment.y, fragment.color);
        return true;
    }

    /// Sets pixel to a color at specified coordinate, bypassing the depth test.
    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let index = self.pixel_index(x, y);
        self.render_data[index + 0] = color.r;
        self.render_data[index + 1] = color.g;
        self.render_data[index + 2] = color.b;
        self.render_data[index + 3] = color.a;
    }

    /// Panics, if (x, y) is outside of the framebuffer.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let index = self.pixel_index(x, y);
        return Color {
            r: self.render_data[index + 0],
            g: self.render_data[index + 1],
            b: self.render_data[index + 2],
            a: self.render_data[index + 3],
        };
    }

    /// Panics, if (x, y) is outside of the framebuffer.
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        return self.z_buffer[self.depth_index(x, y)];
    }

    /// Copy of the current frame as an image, top row first.
    pub fn to_image(&self) -> RgbaImage {
        return RgbaImage::from_fn(self.width, self.height, |x, row| {
            let color = self.pixel(x, self.height - 1 - row);
            image::Rgba([color.r, color.g, color.b, color.a])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn fragment(x: u32, y: u32, depth: f32, color: Color) -> Fragment {
        return Fragment {
            x,
            y,
            depth,
            color,
            intensity: 1.0,
            normal: vector![0.0, 0.0, 1.0],
            world_pos: vector![0.0, 0.0, 0.0],
            original_pos: vector![0.0, 0.0, 0.0],
        };
    }

    #[test]
    fn clear_resets_depth_and_color() {
        let mut framebuffer = Framebuffer::new(4, 3, Color::new(10, 20, 30));
        assert!(framebuffer.submit(&fragment(1, 1, 0.5, Color::WHITE)));
        framebuffer.clear();
        assert_eq!(framebuffer.depth_at(1, 1), Framebuffer::CLEAR_DEPTH);
        assert_eq!(framebuffer.pixel(1, 1), Color::new(10, 20, 30));
    }

    #[test]
    fn nearer_fragment_wins() {
        let mut framebuffer = Framebuffer::new(4, 4, Color::BLACK);
        assert!(framebuffer.submit(&fragment(2, 2, 0.6, Color::new(255, 0, 0))));
        assert!(framebuffer.submit(&fragment(2, 2, 0.3, Color::new(0, 255, 0))));
        assert!(!framebuffer.submit(&fragment(2, 2, 0.4, Color::new(0, 0, 255))));
        assert_eq!(framebuffer.pixel(2, 2), Color::new(0, 255, 0));
        assert_eq!(framebuffer.depth_at(2, 2), 0.3);
    }

    #[test]
    fn resubmitting_same_fragment_is_noop() {
        let mut framebuffer = Framebuffer::new(4, 4, Color::BLACK);
        let frag = fragment(3, 0, 0.25, Color::new(1, 2, 3));
        assert!(framebuffer.submit(&frag));
        let color = framebuffer.pixel(3, 0);
        let depth = framebuffer.depth_at(3, 0);
        assert!(!framebuffer.submit(&frag));
        assert_eq!(framebuffer.pixel(3, 0), color);
        assert_eq!(framebuffer.depth_at(3, 0), depth);
    }

    #[test]
    fn equal_depth_keeps_first_writer() {
        let mut framebuffer = Framebuffer::new(2, 2, Color::BLACK);
        framebuffer.submit(&fragment(0, 0, 0.5, Color::new(9, 9, 9)));
        framebuffer.submit(&fragment(0, 0, 0.5, Color::new(7, 7, 7)));
        assert_eq!(framebuffer.pixel(0, 0), Color::new(9, 9, 9));
    }

    #[test]
    fn out_of_bounds_and_nan_are_ignored() {
        let mut framebuffer = Framebuffer::new(2, 2, Color::BLACK);
        assert!(!framebuffer.submit(&fragment(2, 0, 0.1, Color::WHITE)));
        assert!(!framebuffer.submit(&fragment(0, 5, 0.1, Color::WHITE)));
        assert!(!framebuffer.submit(&fragment(0, 0, f32::NAN, Color::WHITE)));
        assert_eq!(framebuffer.depth_at(0, 0), Framebuffer::CLEAR_DEPTH);
    }

    #[test]
    #[should_panic]
    fn reading_pixel_outside_panics() {
        Framebuffer::new(3, 2, Color::BLACK).pixel(0, 2);
    }

    #[test]
    #[should_panic]
    fn reading_depth_outside_panics() {
        Framebuffer::new(3, 2, Color::BLACK).depth_at(1, 5);
    }

    #[test]
    fn bottom_left_origin_in_image() {
        let mut framebuffer = Framebuffer::new(3, 2, Color::BLACK);
        framebuffer.submit(&fragment(0, 0, 0.1, Color::WHITE));
        let image = framebuffer.to_image();
        assert_eq!(image.get_pixel(0, 1).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn scaled_color_keeps_alpha_and_darkens() {
        let color = Color { r: 200, g: 100, b: 50, a: 128 }.scaled(0.5);
        assert_eq!(color.a, 128);
        assert!((color.r as i32 - 100).abs() <= 1);
        assert!((color.g as i32 - 50).abs() <= 1);
        assert!((color.b as i32 - 25).abs() <= 1);
        assert_eq!(Color::WHITE.scaled(0.0), Color::BLACK);
    }
}
