use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::thread;

use crate::general::negative::Reflector;
use crate::io::midi_file::DRUM_CHANNEL;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const POLY_AFTERTOUCH: u8 = 0xA0;

/// Rewrites note bytes of a live stream, remembering which output key each
/// sounding note was sent as.
#[derive(Debug, Default)]
pub struct NoteMapper {
    // (channel, input key) -> output key
    active: HashMap<(u8, u8), u8>,
}

impl NoteMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notes currently held.
    pub fn active_notes(&self) -> usize {
        self.active.len()
    }

    /// Negate a raw MIDI message in place.
    ///
    /// Only note-on, note-off and poly aftertouch on non-drum channels are
    /// changed. Note-offs and aftertouch reuse the key chosen at note-on so a
    /// settings change mid-note cannot leave it hanging.
    pub fn apply(&mut self, msg: &mut [u8], reflector: &Reflector) {
        if msg.len() < 2 {
            return;
        }
        let status = msg[0] & 0xF0;
        let channel = msg[0] & 0x0F;
        if channel == DRUM_CHANNEL {
            return;
        }
        let key = msg[1] & 0x7F;
        // note-on with velocity 0 is a note-off
        let is_release = status == NOTE_OFF || (status == NOTE_ON && msg.get(2) == Some(&0));

        match status {
            NOTE_ON | NOTE_OFF if is_release => {
                let out = self
                    .active
                    .remove(&(channel, key))
                    .unwrap_or_else(|| reflector.negate_pitch(key));
                msg[1] = out;
            }
            NOTE_ON => {
                let out = reflector.negate_pitch(key);
                self.active.insert((channel, key), out);
                msg[1] = out;
            }
            POLY_AFTERTOUCH => {
                msg[1] = self
                    .active
                    .get(&(channel, key))
                    .copied()
                    .unwrap_or_else(|| reflector.negate_pitch(key));
            }
            _ => {}
        }
    }
}

/// Spawn a forwarding thread that owns the provided `conn_out` and listens on `rx`.
/// Each incoming raw MIDI message is negated with the current live settings
/// and forwarded to the output port.
pub fn spawn_forwarder(
    mut conn_out: midir::MidiOutputConnection,
    rx: Receiver<Vec<u8>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut mapper = NoteMapper::new();
        for mut msg in rx {
            if msg.is_empty() {
                continue;
            }
            let original = msg.get(1).copied();
            let reflector = crate::live_reflector();
            mapper.apply(&mut msg, &reflector);

            if crate::is_debug_enabled() && original != msg.get(1).copied() {
                tracing::info!("[{}] {} -> {}", reflector, original.unwrap_or_default(), msg[1]);
            }

            if let Err(err) = conn_out.send(&msg) {
                tracing::error!("Error sending MIDI message to output: {}", err);
            }
        }
        // Receiver closed -> thread exits
        tracing::debug!("Forwarder exiting with {} note(s) still held", mapper.active_notes());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general::negative::{ReflectionMode, TargetOctave};
    use crate::general::pitch::PitchClass;

    fn ca(generator: PitchClass) -> Reflector {
        Reflector::new(generator, ReflectionMode::Ca, TargetOctave::default())
    }

    #[test]
    fn note_on_and_off_are_negated() {
        let mut mapper = NoteMapper::new();
        let mut on = [0x90, 60, 100];
        mapper.apply(&mut on, &ca(PitchClass::C));
        assert_eq!(on, [0x90, 67, 100]);
        assert_eq!(mapper.active_notes(), 1);

        let mut off = [0x80, 60, 0];
        mapper.apply(&mut off, &ca(PitchClass::C));
        assert_eq!(off, [0x80, 67, 0]);
        assert_eq!(mapper.active_notes(), 0);
    }

    #[test]
    fn release_keeps_key_after_settings_change() {
        let mut mapper = NoteMapper::new();
        let mut on = [0x91, 64, 90];
        mapper.apply(&mut on, &ca(PitchClass::C));
        assert_eq!(on[1], 63);

        // velocity-zero note-on under a different generator
        let mut off = [0x91, 64, 0];
        mapper.apply(&mut off, &ca(PitchClass::G));
        assert_eq!(off[1], 63);
    }

    #[test]
    fn drum_channel_and_other_messages_pass_through() {
        let mut mapper = NoteMapper::new();
        let mut drum = [0x99, 36, 120];
        mapper.apply(&mut drum, &ca(PitchClass::C));
        assert_eq!(drum, [0x99, 36, 120]);

        let mut cc = [0xB0, 64, 127];
        mapper.apply(&mut cc, &ca(PitchClass::C));
        assert_eq!(cc, [0xB0, 64, 127]);

        let mut short = [0xF8];
        mapper.apply(&mut short, &ca(PitchClass::C));
        assert_eq!(short, [0xF8]);
    }

    #[test]
    fn aftertouch_follows_the_held_note() {
        let mut mapper = NoteMapper::new();
        let mut on = [0x90, 60, 100];
        mapper.apply(&mut on, &ca(PitchClass::C));
        let mut pressure = [0xA0, 60, 40];
        mapper.apply(&mut pressure, &ca(PitchClass::D));
        assert_eq!(pressure, [0xA0, 67, 40]);
    }
}
