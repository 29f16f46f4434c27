//! City configuration: motion rates, chunk geometry, palette.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::Error;
use crate::core::types::Result;

/// Packed `0xRRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    /// Channels in `[0, 1]`, no gamma conversion.
    pub fn to_srgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }

    /// Channels converted to linear space for lighting math.
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb().map(|c| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xffffff)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#').trim_start_matches("0x");
        if hex.len() != 6 {
            return Err(Error::config("color", format!("must be #rrggbb (got {s:?})")));
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| Error::config("color", format!("must be #rrggbb (got {s:?})")))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Scene colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Building and debris base color
    pub building: Color,
    /// Ambient light color
    pub light: Color,
    /// Clear color, also used for fog
    pub sky: Color,
    /// Ground tile color
    pub ground: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            building: Color(0x242424),
            light: Color(0x444444),
            sky: Color(0xaaaaaa),
            ground: Color(0x969696),
        }
    }
}

/// Camera placement and projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye height above the ground plane
    pub height: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 8.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Full parameter set for the city.
///
/// Read by every stage; edited only through [`crate::city::ControlEdit`]s
/// applied between ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Hemisphere light intensity
    pub brightness: f32,
    /// Fog far plane
    pub fog_distance: f32,
    /// Travel distance per tick, also the debris climb per tick
    pub speed: f32,
    /// Edge length of one square chunk
    pub chunk_size: f32,
    /// Chunks kept instantiated: one ahead of the start, the rest behind
    pub chunks_at_a_time: u32,
    /// Debris pieces in the ideal set
    pub debris_per_chunk: u32,
    /// Debris wrap height as a multiple of `chunk_size`
    pub debris_max_ascend: f32,
    pub small_building_size: f32,
    pub large_building_size: f32,
    pub palette: Palette,
    pub camera: CameraConfig,
    /// Debris RNG seed. Drawn at random (and logged) when absent.
    pub seed: Option<u64>,
    /// Fixed tick rate in Hz. `None` ticks once per redraw.
    pub tick_rate: Option<f32>,
    /// Control surface TCP port. `None` disables the server.
    pub control_port: Option<u16>,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            fog_distance: 720.0,
            speed: 0.7,
            chunk_size: 128.0,
            chunks_at_a_time: 6,
            debris_per_chunk: 150,
            debris_max_ascend: 2.0,
            small_building_size: 10.0,
            large_building_size: 12.0,
            palette: Palette::default(),
            camera: CameraConfig::default(),
            seed: None,
            tick_rate: None,
            control_port: Some(fallcity_control::DEFAULT_PORT),
        }
    }
}

fn require_positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::config(field, format!("must be positive and finite (got {value})")))
    }
}

impl CityConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: CityConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Height at which debris wraps back to the ground.
    pub fn debris_period(&self) -> f32 {
        self.chunk_size * self.debris_max_ascend
    }

    /// Extent covered by instantiated chunks behind the camera's start.
    pub fn coverage_behind(&self) -> f32 {
        self.chunk_size * (self.chunks_at_a_time as f32 - 0.5)
    }

    /// Reject values that would make generation or wrap-around degenerate.
    pub fn validate(&self) -> Result<()> {
        require_positive("chunk_size", self.chunk_size)?;
        require_positive("speed", self.speed)?;
        require_positive("fog_distance", self.fog_distance)?;
        require_positive("debris_max_ascend", self.debris_max_ascend)?;
        require_positive("small_building_size", self.small_building_size)?;
        require_positive("large_building_size", self.large_building_size)?;

        if !(self.brightness.is_finite() && self.brightness >= 0.0) {
            return Err(Error::config(
                "brightness",
                format!("must be non-negative (got {})", self.brightness),
            ));
        }
        if self.debris_per_chunk == 0 {
            return Err(Error::config("debris_per_chunk", "must be at least 1"));
        }
        if self.chunks_at_a_time == 0 {
            return Err(Error::config("chunks_at_a_time", "must be at least 1"));
        }

        // One tick may not advance further than either wrap period
        let max_step = self.chunk_size.min(self.debris_period());
        if self.speed > max_step {
            return Err(Error::config(
                "speed",
                format!("must not exceed {max_step} per tick (got {})", self.speed),
            ));
        }

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(Error::config(
                "camera.fov_degrees",
                format!("must be in (0, 180) (got {})", cam.fov_degrees),
            ));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(Error::config(
                "camera.near",
                format!("must satisfy 0 < near < far (got {} / {})", cam.near, cam.far),
            ));
        }
        if !cam.height.is_finite() {
            return Err(Error::config("camera.height", "must be finite"));
        }

        if let Some(rate) = self.tick_rate {
            require_positive("tick_rate", rate)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = CityConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.chunk_size, 128.0);
        assert_eq!(cfg.chunks_at_a_time, 6);
        assert_eq!(cfg.debris_per_chunk, 150);
        assert_eq!(cfg.debris_period(), 256.0);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let cases: Vec<fn(&mut CityConfig)> = vec![
            |c: &mut CityConfig| c.chunk_size = 0.0,
            |c: &mut CityConfig| c.chunk_size = -128.0,
            |c: &mut CityConfig| c.speed = 0.0,
            |c: &mut CityConfig| c.speed = f32::NAN,
            |c: &mut CityConfig| c.debris_per_chunk = 0,
            |c: &mut CityConfig| c.chunks_at_a_time = 0,
            |c: &mut CityConfig| c.fog_distance = 0.0,
            |c: &mut CityConfig| c.debris_max_ascend = 0.0,
            |c: &mut CityConfig| c.brightness = -1.0,
            |c: &mut CityConfig| c.tick_rate = Some(0.0),
        ];
        for mutate in cases {
            let mut cfg = CityConfig::default();
            mutate(&mut cfg);
            assert!(matches!(cfg.validate(), Err(Error::Config(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_rejects_speed_beyond_wrap_period() {
        let mut cfg = CityConfig::default();
        cfg.speed = cfg.chunk_size + 1.0;
        assert!(cfg.validate().is_err());

        // Short debris column tightens the bound
        cfg.speed = 100.0;
        cfg.debris_max_ascend = 0.5;
        assert!(cfg.validate().is_err());
        cfg.speed = 64.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_brightness_allowed() {
        let mut cfg = CityConfig::default();
        cfg.brightness = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_color_parse_and_display() {
        let c: Color = "#aaaaaa".parse().unwrap();
        assert_eq!(c, Color(0xaaaaaa));
        assert_eq!(c.to_string(), "#aaaaaa");
        assert_eq!("0x242424".parse::<Color>().unwrap(), Color(0x242424));
        assert!("#abc".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_channels() {
        let srgb = Color(0xff8000).to_srgb();
        assert_eq!(srgb[0], 1.0);
        assert!((srgb[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(srgb[2], 0.0);
        let linear = Color::WHITE.to_linear();
        assert!(linear.iter().all(|c| (c - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let cfg: CityConfig =
            serde_json::from_str(r##"{"speed": 1.5, "palette": {"sky": "#102030"}}"##).unwrap();
        assert_eq!(cfg.speed, 1.5);
        assert_eq!(cfg.palette.sky, Color(0x102030));
        assert_eq!(cfg.palette.building, Color(0x242424));
        assert_eq!(cfg.chunk_size, 128.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"debris_per_chunk": 32, "seed": 7}}"#).unwrap();

        let cfg = CityConfig::load(file.path()).unwrap();
        assert_eq!(cfg.debris_per_chunk, 32);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"chunk_size": 0}}"#).unwrap();
        assert!(matches!(CityConfig::load(file.path()), Err(Error::Config(_))));

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "not json").unwrap();
        assert!(matches!(CityConfig::load(garbage.path()), Err(Error::Parse(_))));
    }
}
