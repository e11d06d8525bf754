//! Negative harmony for MIDI: reflect every note around the axis of a chosen
//! generator, either over a Standard MIDI File or live between two ports.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

pub mod config;
pub mod error;
pub mod general;
pub mod io;
pub mod live;
pub mod remote;

pub use config::Config;
pub use error::{Error, Result};
pub use general::negative::{
    reflect, Reflection, ReflectionMode, Reflector, TargetOctave, FALLBACK_PITCH,
};
pub use general::pitch::{NoteName, PitchClass, ScaleRotation};
pub use io::midi_file::{negate_file, negate_smf, output_file_name, NegateOutcome, NegateStats};

// Live mode state shared by the forwarder, console and OSC threads
pub static EXIT_FLAG: AtomicBool = AtomicBool::new(false);
pub static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LIVE_MODE: AtomicU8 = AtomicU8::new(ReflectionMode::Ca as u8);
static LIVE_GENERATOR: AtomicU8 = AtomicU8::new(0);
static LIVE_OCTAVE: AtomicU8 = AtomicU8::new(4);

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install the process-wide config. Later calls keep the first value.
pub fn init_config(config: Config) -> &'static Config {
    CONFIG.get_or_init(|| config)
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Reflector built from the current live settings.
pub fn live_reflector() -> Reflector {
    let mode = ReflectionMode::from_index(LIVE_MODE.load(Ordering::SeqCst)).unwrap_or_default();
    let generator = PitchClass::from_index(LIVE_GENERATOR.load(Ordering::SeqCst));
    let octave = TargetOctave::new(LIVE_OCTAVE.load(Ordering::SeqCst)).unwrap_or_default();
    Reflector::new(generator, mode, octave)
}

pub fn set_live_reflector(reflector: &Reflector) {
    set_live_mode(reflector.mode());
    set_live_generator(reflector.generator());
    set_live_octave(reflector.target_octave());
}

pub fn set_live_mode(mode: ReflectionMode) {
    LIVE_MODE.store(mode as u8, Ordering::SeqCst);
}

pub fn set_live_generator(generator: PitchClass) {
    LIVE_GENERATOR.store(generator.index(), Ordering::SeqCst);
}

pub fn set_live_octave(octave: TargetOctave) {
    LIVE_OCTAVE.store(octave.value(), Ordering::SeqCst);
}
