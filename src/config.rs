use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::general::negative::{ReflectionMode, Reflector, TargetOctave};
use crate::general::pitch::PitchClass;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Contents of `config.json`. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub negative: NegativeConfig,
    pub paths: PathsConfig,
    pub midi: MidiPortConfig,
    pub osc: OscConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeConfig {
    pub mode: ReflectionMode,
    pub generator: PitchClass,
    pub octave: TargetOctave,
}

impl NegativeConfig {
    pub fn reflector(&self) -> Reflector {
        Reflector::new(self.generator, self.mode, self.octave)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("midi"),
            output_dir: PathBuf::from("neg"),
        }
    }
}

/// Name substrings used to pick live MIDI ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiPortConfig {
    pub input_port: String,
    pub output_port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub enabled: bool,
    pub listening_host: String,
    pub listening_port: u16,
    pub mode_path: String,
    pub generator_path: String,
    pub octave_path: String,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listening_host: "127.0.0.1".to_string(),
            listening_port: 9069,
            mode_path: "/negative/mode".to_string(),
            generator_path: "/negative/generator".to_string(),
            octave_path: "/negative/octave".to_string(),
        }
    }
}

impl Config {
    /// Load `path`, or fall back to the built-in defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
