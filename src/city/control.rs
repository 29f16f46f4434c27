//! Live parameter edits.
//!
//! Only the five fields below are editable at runtime. An edit is applied to
//! a copy of the config and validated before anything is committed.

use std::fmt;

use fallcity_control::ControlCommand;

use crate::city::config::{CityConfig, Color};
use crate::core::types::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlEdit {
    Brightness(f32),
    FogDistance(f32),
    Speed(f32),
    DebrisPerChunk(u32),
    SkyColor(Color),
}

impl ControlEdit {
    /// Translate a remote command. `Ok(None)` for commands that are not edits.
    pub fn from_command(cmd: &ControlCommand) -> Result<Option<Self>> {
        let edit = match cmd {
            ControlCommand::SetBrightness { value } => Self::Brightness(*value),
            ControlCommand::SetFogDistance { value } => Self::FogDistance(*value),
            ControlCommand::SetSpeed { value } => Self::Speed(*value),
            ControlCommand::SetDebrisPerChunk { value } => Self::DebrisPerChunk(*value),
            ControlCommand::SetSkyColor { color } => Self::SkyColor(color.parse()?),
            _ => return Ok(None),
        };
        Ok(Some(edit))
    }

    /// Config field this edit writes.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Brightness(_) => "brightness",
            Self::FogDistance(_) => "fog_distance",
            Self::Speed(_) => "speed",
            Self::DebrisPerChunk(_) => "debris_per_chunk",
            Self::SkyColor(_) => "palette.sky",
        }
    }

    /// Debris must be rebuilt after this edit.
    pub fn needs_regeneration(&self) -> bool {
        matches!(self, Self::DebrisPerChunk(_))
    }

    fn write(&self, config: &mut CityConfig) {
        match *self {
            Self::Brightness(v) => config.brightness = v,
            Self::FogDistance(v) => config.fog_distance = v,
            Self::Speed(v) => config.speed = v,
            Self::DebrisPerChunk(v) => config.debris_per_chunk = v,
            Self::SkyColor(c) => config.palette.sky = c,
        }
    }

    /// The config that results from this edit, or the validation error.
    /// `config` itself is never modified.
    pub fn applied_to(&self, config: &CityConfig) -> Result<CityConfig> {
        let mut next = config.clone();
        self.write(&mut next);
        next.validate()?;
        Ok(next)
    }
}

impl fmt::Display for ControlEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brightness(v) | Self::FogDistance(v) | Self::Speed(v) => {
                write!(f, "{} = {}", self.field(), v)
            }
            Self::DebrisPerChunk(v) => write!(f, "{} = {}", self.field(), v),
            Self::SkyColor(c) => write!(f, "{} = {}", self.field(), c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;

    #[test]
    fn test_edits_write_their_field() {
        let config = CityConfig::default();

        let next = ControlEdit::Speed(1.5).applied_to(&config).unwrap();
        assert_eq!(next.speed, 1.5);
        assert_eq!(config.speed, 0.7);

        let next = ControlEdit::SkyColor(Color(0x112233)).applied_to(&config).unwrap();
        assert_eq!(next.palette.sky, Color(0x112233));

        let next = ControlEdit::DebrisPerChunk(32).applied_to(&config).unwrap();
        assert_eq!(next.debris_per_chunk, 32);
    }

    #[test]
    fn test_invalid_edits_rejected() {
        let config = CityConfig::default();
        for edit in [
            ControlEdit::Speed(0.0),
            ControlEdit::Speed(-1.0),
            ControlEdit::Speed(500.0),
            ControlEdit::FogDistance(0.0),
            ControlEdit::Brightness(-0.5),
            ControlEdit::Brightness(f32::NAN),
            ControlEdit::DebrisPerChunk(0),
        ] {
            let err = edit.applied_to(&config).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{edit}");
            assert!(err.to_string().contains(edit.field()), "{err}");
        }
    }

    #[test]
    fn test_from_command() {
        let edit = ControlEdit::from_command(&ControlCommand::SetFogDistance { value: 300.0 });
        assert_eq!(edit.unwrap(), Some(ControlEdit::FogDistance(300.0)));

        let edit = ControlEdit::from_command(&ControlCommand::SetSkyColor {
            color: "#336699".into(),
        });
        assert_eq!(edit.unwrap(), Some(ControlEdit::SkyColor(Color(0x336699))));

        assert!(ControlEdit::from_command(&ControlCommand::SetSkyColor { color: "blue".into() })
            .is_err());
        assert_eq!(ControlEdit::from_command(&ControlCommand::Ping).unwrap(), None);
    }

    #[test]
    fn test_only_debris_count_regenerates() {
        assert!(ControlEdit::DebrisPerChunk(10).needs_regeneration());
        assert!(!ControlEdit::Speed(1.0).needs_regeneration());
        assert!(!ControlEdit::SkyColor(Color::WHITE).needs_regeneration());
    }

    #[test]
    fn test_display() {
        assert_eq!(ControlEdit::Speed(1.5).to_string(), "speed = 1.5");
        assert_eq!(ControlEdit::SkyColor(Color(0xaaaaaa)).to_string(), "palette.sky = #aaaaaa");
    }
}
