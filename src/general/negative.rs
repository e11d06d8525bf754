//! Negative harmony: reflecting pitches around the axis between the third and
//! fifth of the generator's scale.
//!
//! Everything here is pure. A [`Reflector`] bundles the run-wide settings
//! (rotated scale, mode, target octave) and maps one pitch at a time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::general::pitch::{NoteName, PitchClass, ScaleRotation};

/// Pitch written when a reflected note leaves the MIDI range.
pub const FALLBACK_PITCH: u8 = 1;

/// Highest valid MIDI key number.
pub const MAX_PITCH: i32 = 127;

/// Which delta formula a reflection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReflectionMode {
    /// Unfolded distance to the negative note.
    Le = 0,
    /// Distance folded to stay near the original octave.
    So,
    /// Unfolded distance anchored to a target octave.
    Fa,
    /// Closest octave copy of the negative note.
    Cn,
    /// Twice the distance to the closest copy of the axis.
    #[default]
    Ca,
}

impl ReflectionMode {
    pub const ALL: [ReflectionMode; 5] = [
        ReflectionMode::Le,
        ReflectionMode::So,
        ReflectionMode::Fa,
        ReflectionMode::Cn,
        ReflectionMode::Ca,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReflectionMode::Le => "le",
            ReflectionMode::So => "so",
            ReflectionMode::Fa => "fa",
            ReflectionMode::Cn => "cn",
            ReflectionMode::Ca => "ca",
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for ReflectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReflectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

impl TryFrom<String> for ReflectionMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReflectionMode> for String {
    fn from(mode: ReflectionMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Octave (0..=10) that mode `fa` anchors its output to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct TargetOctave(u8);

impl TargetOctave {
    pub const MAX: u8 = 10;

    pub fn new(octave: u8) -> Result<Self, Error> {
        if octave <= Self::MAX {
            Ok(Self(octave))
        } else {
            Err(Error::OctaveOutOfRange(octave.to_string()))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for TargetOctave {
    fn default() -> Self {
        Self(4)
    }
}

impl fmt::Display for TargetOctave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for TargetOctave {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(octave) if octave <= Self::MAX => Ok(Self(octave)),
            _ => Err(Error::OctaveOutOfRange(value.to_string())),
        }
    }
}

impl FromStr for TargetOctave {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::OctaveOutOfRange(s.to_string()))?;
        Self::try_from(value)
    }
}

impl From<TargetOctave> for u8 {
    fn from(octave: TargetOctave) -> Self {
        octave.0
    }
}

/// Result of reflecting one pitch, with the intermediate distances kept for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reflection {
    pub pitch: u8,
    pub note: NoteName,
    /// Index of the note within the rotated scale.
    pub position: u8,
    /// Pitch class on the other side of the axis.
    pub negative: PitchClass,
    /// `7 - 2s`, not folded.
    pub to_negative: i32,
    /// Distance to the negative note kept near the original octave.
    pub to_octave_negative: i32,
    /// Distance to the axis in half steps, i.e. `2 * (3.5 - s)`.
    pub axis_half_steps: i32,
    pub octave_distance: i32,
    pub delta: i32,
}

impl Reflection {
    /// Pitch after applying the delta, with the out-of-range fallback.
    pub fn output_pitch(&self) -> u8 {
        apply_delta(self.pitch, self.delta)
    }

    /// False when the output pitch had to fall back.
    pub fn in_range(&self) -> bool {
        (0..=MAX_PITCH).contains(&(self.pitch as i32 + self.delta))
    }

    pub fn axis_distance(&self) -> f32 {
        self.axis_half_steps as f32 / 2.0
    }

    fn log_details(&self, rotation: &ScaleRotation, mode: ReflectionMode) {
        let axis = self.axis_distance();
        tracing::debug!("The negative of {} is {}", self.note.class, self.negative);
        tracing::debug!("|--- Current root: {}", rotation.generator());
        tracing::debug!("|--- Current negative mode: {}", mode);
        tracing::debug!("|--- Current scale: {}", rotation);
        tracing::debug!("|--- Distance to !axis: {}", axis);
        tracing::debug!("|--- Distance to previous !axis: {}", axis - 12.0);
        tracing::debug!("|--- Distance to next !axis: {}", axis + 12.0);
        tracing::debug!("|--- Distance to !note: {}", self.to_octave_negative);
        tracing::debug!("|--- Distance to previous !note: {}", self.to_octave_negative - 12);
        tracing::debug!("|--- Distance to next !note: {}", self.to_octave_negative + 12);
        tracing::debug!("|--- Distance between octaves: {}", self.octave_distance);
        tracing::debug!("|------ Delta pitch: {}", self.delta);
    }
}

/// Add `delta` to `pitch`; anything outside 0..=127 becomes [`FALLBACK_PITCH`].
pub fn apply_delta(pitch: u8, delta: i32) -> u8 {
    let shifted = pitch as i32 + delta;
    if (0..=MAX_PITCH).contains(&shifted) {
        shifted as u8
    } else {
        FALLBACK_PITCH
    }
}

/// Reflect a single pitch. `rotation` must be built from the run's generator.
pub fn reflect(
    pitch: u8,
    rotation: &ScaleRotation,
    mode: ReflectionMode,
    target_octave: TargetOctave,
) -> Reflection {
    let note = NoteName::from_pitch(pitch);
    let s = rotation.position(note.class) as i32;
    let c = rotation.position(PitchClass::C) as i32;

    let to_negative = 7 - 2 * s;
    let to_octave_negative = fold_to_octave(s, c);
    let axis_half_steps = 7 - 2 * s;
    let octave_distance = target_octave.value() as i32 - note.octave as i32;

    let delta = match mode {
        ReflectionMode::Le => to_negative,
        ReflectionMode::So => to_octave_negative,
        ReflectionMode::Fa => to_negative + 24 * octave_distance,
        ReflectionMode::Cn => nearest(to_octave_negative, 12),
        // the axis candidates are already doubled, so no truncation is needed
        ReflectionMode::Ca => nearest(axis_half_steps, 24),
    };

    Reflection {
        pitch,
        note,
        position: s as u8,
        negative: rotation.at(7 - s),
        to_negative,
        to_octave_negative,
        axis_half_steps,
        octave_distance,
        delta,
    }
}

/// Of `value`, `value - octave` and `value + octave`, the one closest to zero.
/// Ties keep the earlier candidate.
fn nearest(value: i32, octave: i32) -> i32 {
    let mut best = value;
    for candidate in [value - octave, value + octave] {
        if candidate.abs() < best.abs() {
            best = candidate;
        }
    }
    best
}

/// Distance from rotated position `s` to its negative, folded by where C
/// (rotated position `c`) falls. The boundaries are not a plain mod-12 fold
/// because the axis sits on a half step.
fn fold_to_octave(s: i32, c: i32) -> i32 {
    let below = -5 - 2 * s;
    let same = 7 - 2 * s;
    let above = 19 - 2 * s;
    let two_above = 31 - 2 * s;

    match c {
        0..=3 => {
            if s < c {
                below
            } else if s < 8 - c {
                same
            } else {
                above
            }
        }
        4..=7 => {
            if s <= 7 - c {
                below
            } else if s < c {
                same
            } else {
                above
            }
        }
        8..=10 => {
            if s < c {
                same
            } else if s <= 19 - c {
                above
            } else {
                two_above
            }
        }
        _ => {
            if s <= 8 {
                same
            } else if s < 11 {
                above
            } else {
                two_above
            }
        }
    }
}

/// Run-wide reflection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reflector {
    rotation: ScaleRotation,
    mode: ReflectionMode,
    target_octave: TargetOctave,
}

impl Reflector {
    pub fn new(generator: PitchClass, mode: ReflectionMode, target_octave: TargetOctave) -> Self {
        Self {
            rotation: ScaleRotation::new(generator),
            mode,
            target_octave,
        }
    }

    pub fn rotation(&self) -> &ScaleRotation {
        &self.rotation
    }

    pub fn generator(&self) -> PitchClass {
        self.rotation.generator()
    }

    pub fn mode(&self) -> ReflectionMode {
        self.mode
    }

    pub fn target_octave(&self) -> TargetOctave {
        self.target_octave
    }

    pub fn reflect(&self, pitch: u8) -> Reflection {
        reflect(pitch, &self.rotation, self.mode, self.target_octave)
    }

    /// Same as [`Reflector::reflect`], logging the distances at debug level.
    pub fn negate(&self, pitch: u8) -> Reflection {
        let reflection = self.reflect(pitch);
        if tracing::enabled!(tracing::Level::DEBUG) {
            reflection.log_details(&self.rotation, self.mode);
        }
        reflection
    }

    /// Reflected pitch, already passed through the range fallback.
    pub fn negate_pitch(&self, pitch: u8) -> u8 {
        self.negate(pitch).output_pitch()
    }

    /// `None` for drum notes, which keep their key.
    pub fn negate_note(&self, pitch: u8, is_drum: bool) -> Option<Reflection> {
        if is_drum {
            None
        } else {
            Some(self.negate(pitch))
        }
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new(PitchClass::C, ReflectionMode::Ca, TargetOctave::default())
    }
}

impl fmt::Display for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} generator={} octave={}",
            self.mode,
            self.rotation.generator(),
            self.target_octave
        )
    }
}
