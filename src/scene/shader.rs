//! Procedural fragment shaders, one per kind of celestial body.
//!
//! Every shader reads the untransformed object space position of the fragment as a 2D texture
//! coordinate, runs it through one or more noise layers and a small palette, and scales the
//! result by the diffuse intensity computed during rasterization. Shaders don't keep any state,
//! so shading the same fragment twice gives the same color.

use nalgebra::{vector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::buffer::Color;
use super::noise::{NoiseGenerator, NoiseKind};
use super::raster::Fragment;
use super::util::{mix, rgb, smoothstep};

/// Closed set of surface materials, picked per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderKind {
    Sun,
    Earth,
    Moon,
    Jupiter,
    Uranus,
    /// Rusty dwarf planet.
    Mars,
    /// Yellow exoplanet with cloud cover.
    Kepler186f,
    /// Raw noise as grayscale, handy for tuning offsets.
    Noise,
    /// Base color times light intensity, no noise at all.
    Lit,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 9] = [
        ShaderKind::Sun,
        ShaderKind::Earth,
        ShaderKind::Moon,
        ShaderKind::Jupiter,
        ShaderKind::Uranus,
        ShaderKind::Mars,
        ShaderKind::Kepler186f,
        ShaderKind::Noise,
        ShaderKind::Lit,
    ];
}

/// Where and how densely a shader samples the noise: (uv + offset) * zoom.
/// Offsets keep bodies sharing the same generator from showing the same pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub offset: [f64; 2],
    pub zoom: f64,
}

impl NoiseLayer {
    pub const fn new(offset_x: f64, offset_y: f64, zoom: f64) -> Self {
        return Self { offset: [offset_x, offset_y], zoom };
    }

    pub fn sample(&self, noise: &NoiseGenerator, uv: Vector2<f32>) -> f32 {
        return noise.get(
            (uv.x as f64 + self.offset[0]) * self.zoom,
            (uv.y as f64 + self.offset[1]) * self.zoom,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunParams {
    pub surface: NoiseLayer,
    /// |noise| range over which dark spots fade into the bright surface.
    pub blend: [f32; 2],
}

/// Ocean, land and cloud layers of a rocky planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    pub surface: NoiseLayer,
    pub ocean_level: f32,
    pub land_blend: [f32; 2],
    pub clouds: NoiseLayer,
    pub cloud_level: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonParams {
    pub surface: NoiseLayer,
    pub dark_level: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DwarfParams {
    pub surface: NoiseLayer,
    /// Anything with |noise| below it is a lowland.
    pub lowland_level: f32,
    pub land_blend: [f32; 2],
}

/// Gas giant: cellular mottling, sinusoidal bands and an optional storm layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandParams {
    pub surface: NoiseLayer,
    pub contrast: [f32; 2],
    pub band_frequency: f32,
    pub band_amplitude: f32,
    pub storm: NoiseLayer,
    pub storm_level: f32,
}

/// Noise constants of every shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderTable {
    pub sun: SunParams,
    pub earth: TerrainParams,
    pub moon: MoonParams,
    pub jupiter: BandParams,
    pub uranus: BandParams,
    pub mars: DwarfParams,
    pub kepler186f: TerrainParams,
    pub noise: NoiseLayer,
}

impl Default for ShaderTable {
    fn default() -> Self {
        return Self {
            sun: SunParams {
                surface: NoiseLayer::new(3200.0, 3000.0, 3000.0),
                blend: [0.3, 0.5],
            },
            earth: TerrainParams {
                surface: NoiseLayer::new(1200.0, 3000.0, 200.0),
                ocean_level: 0.05,
                land_blend: [0.15, 0.96],
                clouds: NoiseLayer::new(5500.0, 6900.0, 300.0),
                cloud_level: 0.5,
            },
            moon: MoonParams {
                surface: NoiseLayer::new(2000.0, 2000.0, 350.0),
                dark_level: 0.4,
            },
            jupiter: BandParams {
                surface: NoiseLayer::new(1000.0, 200.0, 100.0),
                contrast: [0.2, 0.8],
                band_frequency: 10.0,
                band_amplitude: 0.2,
                storm: NoiseLayer::new(5500.0, 7300.0, 80.0),
                storm_level: 0.985,
            },
            uranus: BandParams {
                surface: NoiseLayer::new(1000.0, 200.0, 100.0),
                contrast: [0.2, 0.8],
                band_frequency: 9.0,
                band_amplitude: 0.32,
                // Uranus has no storms, a level above the noise range switches them off.
                storm: NoiseLayer::new(0.0, 0.0, 1.0),
                storm_level: 2.0,
            },
            mars: DwarfParams {
                surface: NoiseLayer::new(3000.0, 1500.0, 150.0),
                lowland_level: 0.4,
                land_blend: [0.15, 0.96],
            },
            kepler186f: TerrainParams {
                surface: NoiseLayer::new(3200.0, 2000.0, 200.0),
                ocean_level: 0.05,
                land_blend: [0.15, 0.96],
                clouds: NoiseLayer::new(3500.0, 5000.0, 300.0),
                cloud_level: 0.5,
            },
            noise: NoiseLayer::new(5500.0, 6900.0, 150.0),
        };
    }
}

/// Colors of a rocky planet, see `terrain`.
struct TerrainPalette {
    ocean: Vector3<f32>,
    forest: Vector3<f32>,
    dirt: Vector3<f32>,
    cloud: Vector3<f32>,
}

/// Bundle of every fragment shader together with the noise generators they sample.
/// Generators are built once here and shared by all fragments.
#[derive(Debug)]
pub struct FragmentShaders {
    table: ShaderTable,
    simplex: NoiseGenerator,
    cellular: NoiseGenerator,
}

impl FragmentShaders {
    pub fn new(table: ShaderTable, seed: u32, frequency: f32) -> Self {
        return Self {
            table,
            simplex: NoiseGenerator::new(NoiseKind::Simplex, seed, frequency),
            cellular: NoiseGenerator::new(NoiseKind::Cellular, seed, frequency),
        };
    }

    /// Runs the shader of the given kind, returning the fragment with its color replaced.
    pub fn shade(&self, kind: ShaderKind, mut fragment: Fragment) -> Fragment {
        let uv = vector![fragment.original_pos.x, fragment.original_pos.y];
        let surface = match kind {
            ShaderKind::Sun => self.sun(uv),
            ShaderKind::Earth => self.terrain(&self.table.earth, &earth_palette(), uv),
            ShaderKind::Moon => self.moon(uv),
            ShaderKind::Jupiter => self.jupiter(uv),
            ShaderKind::Uranus => self.uranus(uv),
            ShaderKind::Mars => self.mars(uv),
            ShaderKind::Kepler186f => self.terrain(&self.table.kepler186f, &kepler_palette(), uv),
            ShaderKind::Noise => {
                let value = self.table.noise.sample(&self.simplex, uv);
                vector![value, value, value]
            }
            ShaderKind::Lit => fragment.color.to_rgb(),
        };
        fragment.color = Color::from_rgb(surface * fragment.intensity);
        return fragment;
    }

    fn sun(&self, uv: Vector2<f32>) -> Vector3<f32> {
        let params = &self.table.sun;
        let bright = rgb(235, 127, 33);
        let dark = rgb(194, 77, 14);
        let value = params.surface.sample(&self.simplex, uv);
        return mix(dark, bright, smoothstep(params.blend[0], params.blend[1], value.abs()));
    }

    /// Ocean below the sea level, forest fading into dirt above it, clouds on top, where a
    /// second noise layer is high enough.
    fn terrain(&self, params: &TerrainParams, palette: &TerrainPalette, uv: Vector2<f32>) -> Vector3<f32> {
        let height = params.surface.sample(&self.simplex, uv);
        let ground = match height < params.ocean_level {
            true => palette.ocean,
            false => mix(palette.forest, palette.dirt, smoothstep(params.land_blend[0], params.land_blend[1], height)),
        };
        let cloud = params.clouds.sample(&self.simplex, uv);
        if cloud > params.cloud_level {
            return palette.cloud;
        }
        return ground;
    }

    fn moon(&self, uv: Vector2<f32>) -> Vector3<f32> {
        let params = &self.table.moon;
        let value = params.surface.sample(&self.simplex, uv);
        return match value < params.dark_level {
            true => rgb(185, 185, 185),
            false => rgb(140, 140, 140),
        };
    }

    fn mars(&self, uv: Vector2<f32>) -> Vector3<f32> {
        let params = &self.table.mars;
        let highland = rgb(161, 89, 67);
        let ridge = rgb(128, 72, 55);
        let lowland = rgb(105, 50, 33);
        let value = params.surface.sample(&self.simplex, uv);
        if value.abs() < params.lowland_level {
            return lowland;
        }
        return mix(highland, ridge, smoothstep(params.land_blend[0], params.land_blend[1], value));
    }

    /// Cellular mottling remapped to [0, 1] and pushed through a contrast curve.
    fn mottling(&self, params: &BandParams, uv: Vector2<f32>) -> f32 {
        let value = params.surface.sample(&self.cellular, uv);
        return smoothstep(params.contrast[0], params.contrast[1], (value + 1.0) * 0.5);
    }

    fn band(params: &BandParams, uv: Vector2<f32>) -> f32 {
        return (uv.y * params.band_frequency).sin() * params.band_amplitude;
    }

    fn jupiter(&self, uv: Vector2<f32>) -> Vector3<f32> {
        let params = &self.table.jupiter;
        let base = rgb(214, 181, 144);
        let band_color = rgb(214, 131, 36);
        let storm_color = rgb(204, 131, 92);
        // Stretching the coordinate, so the bands are dense enough on a unit sphere.
        let uv = uv * 2.0 - vector![1.0, 1.0];

        let mut color = mix(base, Vector3::repeat(1.0), self.mottling(params, uv));
        color = mix(color, band_color, Self::band(params, uv));

        let storm = params.storm.sample(&self.cellular, uv).abs();
        if storm > params.storm_level {
            color = mix(color, storm_color, smoothstep(params.storm_level, 1.0, storm));
        }
        return color;
    }

    fn uranus(&self, uv: Vector2<f32>) -> Vector3<f32> {
        let params = &self.table.uranus;
        let light = rgb(173, 245, 247);
        let medium = rgb(92, 171, 250);
        let deep = rgb(14, 98, 181);
        let uv = uv * 2.0 - vector![1.0, 1.0];

        let value = self.mottling(params, uv);
        let mut color = match value < 0.8 {
            true => mix(light, medium, value),
            false => mix(medium, deep, value),
        };
        color = mix(color, Vector3::repeat(1.0), Self::band(params, uv));

        let storm = params.storm.sample(&self.cellular, uv).abs();
        if storm > params.storm_level {
            color = mix(color, deep, smoothstep(params.storm_level, 1.0, storm));
        }
        return color;
    }
}

fn earth_palette() -> TerrainPalette {
    return TerrainPalette {
        ocean: vector![0.12, 0.38, 0.57],
        forest: vector![0.44, 0.51, 0.33],
        dirt: rgb(179, 147, 120),
        cloud: Vector3::repeat(1.0),
    };
}

fn kepler_palette() -> TerrainPalette {
    return TerrainPalette {
        ocean: rgb(250, 228, 32),
        forest: rgb(186, 152, 28),
        dirt: rgb(148, 121, 22),
        cloud: Vector3::repeat(1.0),
    };
}
