use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sharp spellings in canonical order, starting at C.
pub const NOTE_LABELS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the twelve chromatic pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PitchClass {
    #[default]
    C = 0,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class at canonical index `index % 12`.
    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 12) as usize]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Sharp spelling, e.g. "F#".
    pub fn label(self) -> &'static str {
        NOTE_LABELS[self as usize]
    }

    /// Exact lookup in the sharp table. Flats, lowercase and padding are rejected.
    pub fn from_label(label: &str) -> Option<Self> {
        NOTE_LABELS
            .iter()
            .position(|l| *l == label)
            .map(|idx| Self::ALL[idx])
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PitchClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| Error::UnknownGenerator(s.to_string()))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> Self {
        pc.label().to_string()
    }
}

/// A MIDI pitch split into its pitch class and octave (middle C = 60 = C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    pub class: PitchClass,
    pub octave: i8,
}

impl NoteName {
    pub fn from_pitch(pitch: u8) -> Self {
        Self {
            class: PitchClass::from_index(pitch % 12),
            octave: (pitch / 12) as i8 - 1,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

/// The twelve labels rotated so the generator sits where C sits canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleRotation {
    generator: PitchClass,
    labels: [PitchClass; 12],
}

impl ScaleRotation {
    pub fn new(generator: PitchClass) -> Self {
        // shift = index(C) - index(generator), i.e. rotate left by the generator index
        let mut labels = PitchClass::ALL;
        labels.rotate_left(generator.index() as usize);
        Self { generator, labels }
    }

    pub fn generator(&self) -> PitchClass {
        self.generator
    }

    pub fn labels(&self) -> &[PitchClass; 12] {
        &self.labels
    }

    /// Index of `class` within the rotated sequence.
    pub fn position(&self, class: PitchClass) -> u8 {
        self.labels
            .iter()
            .position(|pc| *pc == class)
            .map(|idx| idx as u8)
            .unwrap_or(0)
    }

    /// Label at a rotated position, wrapping cyclically in both directions.
    pub fn at(&self, position: i32) -> PitchClass {
        self.labels[position.rem_euclid(12) as usize]
    }
}

impl Default for ScaleRotation {
    fn default() -> Self {
        Self::new(PitchClass::C)
    }
}

impl fmt::Display for ScaleRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.labels.iter().map(|pc| pc.label()).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}
