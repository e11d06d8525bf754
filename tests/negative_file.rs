use std::fs;
use std::path::Path;

use midly::num::{u15, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use negative_harmony::{
    negate_file, negate_smf, Error, PitchClass, ReflectionMode, Reflector, TargetOctave,
    FALLBACK_PITCH,
};

fn note(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(channel),
            message,
        },
    }
}

fn on(key: u8) -> MidiMessage {
    MidiMessage::NoteOn {
        key: u7::new(key),
        vel: u7::new(100),
    }
}

fn off(key: u8) -> MidiMessage {
    MidiMessage::NoteOff {
        key: u7::new(key),
        vel: u7::new(0),
    }
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// Two tracks: a melody on channel 0 and a drum part on channel 9.
fn sample_smf() -> Smf<'static> {
    let melody: Track<'static> = vec![
        note(0, 0, on(60)),
        note(0, 0, MidiMessage::Controller { controller: u7::new(64), value: u7::new(127) }),
        note(480, 0, off(60)),
        note(0, 0, on(64)),
        note(480, 0, off(64)),
        end_of_track(),
    ];
    let drums: Track<'static> = vec![note(0, 9, on(36)), note(240, 9, off(36)), end_of_track()];
    Smf {
        header: Header::new(Format::Parallel, Timing::Metrical(u15::new(480))),
        tracks: vec![melody, drums],
    }
}

fn keys(track: &Track<'_>) -> Vec<u8> {
    track
        .iter()
        .filter_map(|event| match event.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
                ..
            } => Some(key.as_int()),
            _ => None,
        })
        .collect()
}

fn write_input(dir: &Path, name: &str, smf: &Smf<'_>) {
    fs::create_dir_all(dir).unwrap();
    smf.save(dir.join(name)).unwrap();
}

#[test]
fn negates_melody_and_keeps_drums() {
    let mut smf = sample_smf();
    let reflector = Reflector::default();
    let stats = negate_smf(&mut smf, &reflector);

    assert_eq!(keys(&smf.tracks[0]), vec![67, 67, 63, 63]);
    assert_eq!(keys(&smf.tracks[1]), vec![36, 36]);
    assert_eq!(stats.reflected, 4);
    assert_eq!(stats.drums, 2);
    assert_eq!(stats.fallbacks, 0);
}

#[test]
fn non_note_events_are_untouched() {
    let mut smf = sample_smf();
    let before: Vec<_> = smf.tracks[0].iter().map(|e| (e.delta, e.kind)).collect();
    negate_smf(&mut smf, &Reflector::default());
    let after: Vec<_> = smf.tracks[0].iter().map(|e| (e.delta, e.kind)).collect();

    assert_eq!(before.len(), after.len());
    assert_eq!(before[1], after[1]);
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.0, a.0);
    }
}

#[test]
fn out_of_range_notes_become_pitch_one() {
    let mut smf = Smf {
        header: Header::new(Format::SingleTrack, Timing::Metrical(u15::new(96))),
        tracks: vec![vec![note(0, 2, on(11)), note(96, 2, off(11)), end_of_track()]],
    };
    let reflector = Reflector::new(PitchClass::C, ReflectionMode::Le, TargetOctave::default());
    let stats = negate_smf(&mut smf, &reflector);

    assert_eq!(keys(&smf.tracks[0]), vec![FALLBACK_PITCH, FALLBACK_PITCH]);
    assert_eq!(stats.fallbacks, 2);
}

#[test]
fn writes_named_output_into_created_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("midi");
    let output_dir = dir.path().join("neg");
    write_input(&input_dir, "song.mid", &sample_smf());

    let reflector = Reflector::default();
    let outcome =
        negate_file(&input_dir.join("song.mid"), "song.mid", &output_dir, &reflector).unwrap();

    assert_eq!(outcome.output, output_dir.join("neg_ca_song.mid.mid"));
    let data = fs::read(&outcome.output).unwrap();
    let written = Smf::parse(&data).unwrap();
    assert_eq!(written.tracks.len(), 2);
    assert_eq!(keys(&written.tracks[0]), vec![67, 67, 63, 63]);
    assert_eq!(keys(&written.tracks[1]), vec![36, 36]);
}

#[test]
fn fa_output_name_and_octave_anchor() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), "line.mid", &sample_smf());

    let octave = TargetOctave::new(5).unwrap();
    let reflector = Reflector::new(PitchClass::C, ReflectionMode::Fa, octave);
    let out_dir = dir.path().join("out");
    let input = dir.path().join("line.mid");
    let outcome = negate_file(&input, "line.mid", &out_dir, &reflector).unwrap();

    assert_eq!(outcome.output, out_dir.join("neg_fa_O=5_line.mid"));
    let data = fs::read(&outcome.output).unwrap();
    let written = Smf::parse(&data).unwrap();
    // C4 -> 60 + 7 + 24, E4 -> 64 - 1 + 24
    assert_eq!(keys(&written.tracks[0]), vec![91, 91, 87, 87]);
}

#[test]
fn generator_changes_the_axis() {
    let mut smf = sample_smf();
    let reflector = Reflector::new(PitchClass::G, ReflectionMode::Ca, TargetOctave::default());
    negate_smf(&mut smf, &reflector);
    // around G the axis sits between A# and B: C -> A, E -> F
    assert_eq!(keys(&smf.tracks[0]), vec![57, 57, 53, 53]);
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("neg");
    let input = dir.path().join("nope.mid");
    let err = negate_file(&input, "nope.mid", &out_dir, &Reflector::default()).unwrap_err();

    assert!(matches!(err, Error::Io { .. }));
    assert!(!out_dir.exists());
}

#[test]
fn garbage_input_is_a_midi_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.mid");
    fs::write(&input, b"not a midi file").unwrap();
    let out_dir = dir.path().join("neg");
    let err = negate_file(&input, "bad.mid", &out_dir, &Reflector::default()).unwrap_err();

    assert!(matches!(err, Error::Midi { .. }));
}
