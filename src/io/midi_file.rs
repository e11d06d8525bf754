use std::fs;
use std::path::{Path, PathBuf};

use midly::num::u7;
use midly::{MidiMessage, Smf, TrackEventKind};

use crate::error::{Error, Result};
use crate::general::negative::{ReflectionMode, Reflector, TargetOctave};

/// Zero-based channel General MIDI reserves for percussion.
pub const DRUM_CHANNEL: u8 = 9;

/// Counts gathered while negating a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegateStats {
    /// Note events whose key went through the reflector.
    pub reflected: usize,
    /// Note events left alone because they sit on the drum channel.
    pub drums: usize,
    /// Reflected note events that ended up on the fallback pitch.
    pub fallbacks: usize,
}

/// Finished file transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegateOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: NegateStats,
}

/// Output file name for a transformed `input_name`.
///
/// Mode `fa` keeps the input name as is; the other modes append `.mid`.
pub fn output_file_name(mode: ReflectionMode, octave: TargetOctave, input_name: &str) -> String {
    match mode {
        ReflectionMode::Fa => format!("neg_fa_O={}_{}", octave, input_name),
        _ => format!("neg_{}_{}.mid", mode, input_name),
    }
}

/// Key number carried by a note event, if `message` is one.
fn note_key(message: &mut MidiMessage) -> Option<&mut u7> {
    match message {
        MidiMessage::NoteOn { key, .. }
        | MidiMessage::NoteOff { key, .. }
        | MidiMessage::Aftertouch { key, .. } => Some(key),
        _ => None,
    }
}

/// Reflect every non-drum note key of `smf` in place.
pub fn negate_smf(smf: &mut Smf<'_>, reflector: &Reflector) -> NegateStats {
    let mut stats = NegateStats::default();
    for track in smf.tracks.iter_mut() {
        for event in track.iter_mut() {
            if let TrackEventKind::Midi { channel, message } = &mut event.kind {
                let Some(key) = note_key(message) else {
                    continue;
                };
                let is_drum = channel.as_int() == DRUM_CHANNEL;
                let Some(reflection) = reflector.negate_note(key.as_int(), is_drum) else {
                    stats.drums += 1;
                    continue;
                };
                if !reflection.in_range() {
                    stats.fallbacks += 1;
                }
                *key = u7::new(reflection.output_pitch());
                stats.reflected += 1;
            }
        }
    }
    stats
}

/// Read `input`, negate it, and write the result into `output_dir`.
///
/// `input_name` is the name the output file is derived from; the output
/// directory is created if it does not exist yet.
pub fn negate_file(
    input: &Path,
    input_name: &str,
    output_dir: &Path,
    reflector: &Reflector,
) -> Result<NegateOutcome> {
    tracing::info!("Input MIDI file: {}", input.display());
    let data = fs::read(input).map_err(|source| Error::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let mut smf = Smf::parse(&data).map_err(|err| Error::Midi {
        path: input.to_path_buf(),
        message: err.to_string(),
    })?;
    tracing::debug!(
        "Parsed {} track(s), format {:?}",
        smf.tracks.len(),
        smf.header.format
    );

    let stats = negate_smf(&mut smf, reflector);

    fs::create_dir_all(output_dir).map_err(|source| Error::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let output = output_dir.join(output_file_name(
        reflector.mode(),
        reflector.target_octave(),
        input_name,
    ));
    smf.save(&output).map_err(|source| Error::Io {
        path: output.clone(),
        source,
    })?;

    tracing::info!(
        "Wrote {} ({} notes reflected, {} drum notes kept, {} out of range)",
        output.display(),
        stats.reflected,
        stats.drums,
        stats.fallbacks
    );
    Ok(NegateOutcome {
        input: input.to_path_buf(),
        output,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fa_output_keeps_the_input_name() {
        let octave = TargetOctave::new(5).unwrap();
        assert_eq!(
            output_file_name(ReflectionMode::Fa, octave, "song.mid"),
            "neg_fa_O=5_song.mid"
        );
    }

    #[test]
    fn other_modes_append_mid() {
        let octave = TargetOctave::default();
        assert_eq!(
            output_file_name(ReflectionMode::Ca, octave, "song.mid"),
            "neg_ca_song.mid.mid"
        );
        assert_eq!(output_file_name(ReflectionMode::Le, octave, "tune"), "neg_le_tune.mid");
    }
}
