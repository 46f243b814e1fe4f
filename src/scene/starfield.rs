use super::buffer::{Color, Framebuffer};
use super::noise::{NoiseGenerator, NoiseKind};
use super::raster::Fragment;
use crate::config::StarfieldConfig;

use nalgebra::Vector3;

/// Background stars, scattered by noise at an offset, that drifts a little every frame.
/// Stars go through the regular depth test far behind everything else, so geometry covers them.
#[derive(Debug)]
pub struct Starfield {
    noise: NoiseGenerator,
    count: u32,
    spacing: f64,
    depth: f32,
    drift: f64,
    offset: [f64; 2],
}

impl Starfield {
    pub fn new(config: &StarfieldConfig, seed: u32, frequency: f32) -> Self {
        return Self {
            noise: NoiseGenerator::new(NoiseKind::Simplex, seed, frequency),
            count: config.count,
            spacing: config.spacing as f64,
            depth: config.depth,
            drift: config.drift as f64,
            offset: config.offset,
        };
    }

    /// Moves the sampling window, stars slowly wander across the screen.
    pub fn advance(&mut self) {
        self.offset[0] += self.drift;
        self.offset[1] += self.drift;
    }

    /// Star fragments at the current offset.
    pub fn fragments(&self, width: u32, height: u32) -> impl Iterator<Item = Fragment> + '_ {
        let [ox, oy] = self.offset;
        return (0..self.count).map(move |i| {
            let t = i as f64 * self.spacing;
            let x = self.noise.get(t + ox, oy).abs() * width as f32;
            let y = self.noise.get(t + oy, ox).abs() * height as f32;
            // Dimmest stars still stay visible against the background.
            let brightness = 0.4 + 0.6 * self.noise.get(t + ox, t + oy).abs();
            Fragment {
                x: x as u32,
                y: y as u32,
                depth: self.depth,
                color: Color::WHITE.scaled(brightness),
                intensity: brightness,
                normal: Vector3::zeros(),
                world_pos: Vector3::zeros(),
                original_pos: Vector3::zeros(),
            }
        });
    }

    /// Writes stars through the depth test, returns how many made it.
    pub fn draw(&self, framebuffer: &mut Framebuffer) -> u32 {
        let mut written = 0;
        for star in self.fragments(framebuffer.width, framebuffer.height) {
            if framebuffer.submit(&star) {
                written += 1;
            }
        }
        return written;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starfield() -> Starfield {
        return Starfield::new(&StarfieldConfig::default(), 1337, 0.01);
    }

    #[test]
    fn stars_are_deterministic_and_on_screen() {
        let stars: Vec<Fragment> = starfield().fragments(320, 200).collect();
        let again: Vec<Fragment> = starfield().fragments(320, 200).collect();
        assert_eq!(stars, again);
        assert_eq!(stars.len(), StarfieldConfig::default().count as usize);
        assert!(stars.iter().all(|star| star.x <= 320 && star.y <= 200));
    }

    #[test]
    fn advancing_moves_stars() {
        let mut field = starfield();
        let before: Vec<Fragment> = field.fragments(1280, 720).collect();
        for _ in 0..20000 {
            field.advance();
        }
        let after: Vec<Fragment> = field.fragments(1280, 720).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn geometry_hides_stars() {
        let field = starfield();
        let mut framebuffer = Framebuffer::new(64, 64, Color::BLACK);
        let stars: Vec<Fragment> = field.fragments(64, 64).filter(|s| s.x < 64 && s.y < 64).collect();
        let first = stars[0];
        let mut planet = first;
        planet.depth = 0.5;
        planet.color = Color::new(10, 200, 10);
        assert!(framebuffer.submit(&planet));
        field.draw(&mut framebuffer);
        assert_eq!(framebuffer.pixel(first.x, first.y), Color::new(10, 200, 10));
    }
}
