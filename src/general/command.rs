use std::sync::atomic::Ordering;

use crate::general::negative::{ReflectionMode, TargetOctave};
use crate::general::pitch::PitchClass;

/// A live-mode control action, from the console or OSC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(ReflectionMode),
    Generator(PitchClass),
    Octave(TargetOctave),
    Debug(bool),
    Status,
    Help,
    Exit,
    /// Recognized keyword with a bad value; holds the message to show.
    Invalid(String),
    Unknown(String),
}

/// Parse one console line. An empty line means exit.
pub fn parse_command(line: &str) -> Command {
    let cmd = line.trim();
    if cmd.is_empty() {
        return Command::Exit;
    }

    let mut parts = cmd.split_whitespace();
    let keyword = parts.next().unwrap_or_default().to_ascii_lowercase();
    let value = parts.next();

    match (keyword.as_str(), value) {
        ("exit" | "quit" | "q", None) => Command::Exit,
        ("help" | "h", None) => Command::Help,
        ("status", None) => Command::Status,
        ("debug", Some(v)) if is_one_of(v, &["on", "enable"]) => Command::Debug(true),
        ("debug", Some(v)) if is_one_of(v, &["off", "disable"]) => Command::Debug(false),
        ("mode", Some(v)) => match v.parse() {
            Ok(mode) => Command::Mode(mode),
            Err(err) => Command::Invalid(err.to_string()),
        },
        ("gen" | "generator", Some(v)) => match v.parse() {
            Ok(generator) => Command::Generator(generator),
            Err(err) => Command::Invalid(err.to_string()),
        },
        ("octave" | "oct", Some(v)) => match v.parse() {
            Ok(octave) => Command::Octave(octave),
            Err(err) => Command::Invalid(err.to_string()),
        },
        _ => Command::Unknown(cmd.to_string()),
    }
}

fn is_one_of(value: &str, words: &[&str]) -> bool {
    words.iter().any(|word| value.eq_ignore_ascii_case(word))
}

/// Apply a command to the live settings. Returns the line to report back.
pub fn apply_command(command: &Command) -> String {
    match command {
        Command::Mode(mode) => {
            crate::set_live_mode(*mode);
            format!("Negative mode set to {}", mode)
        }
        Command::Generator(generator) => {
            crate::set_live_generator(*generator);
            let reflector = crate::live_reflector();
            format!("Generator set to {} (scale {})", generator, reflector.rotation())
        }
        Command::Octave(octave) => {
            crate::set_live_octave(*octave);
            format!("Target octave set to {}", octave)
        }
        Command::Debug(on) => {
            crate::DEBUG_ENABLED.store(*on, Ordering::SeqCst);
            if *on {
                "Debug enabled".to_string()
            } else {
                "Debug disabled".to_string()
            }
        }
        Command::Status => format!("Current settings: {}", crate::live_reflector()),
        Command::Help => HELP.to_string(),
        Command::Exit => {
            crate::EXIT_FLAG.store(true, Ordering::SeqCst);
            "Exiting...".to_string()
        }
        Command::Invalid(message) => message.clone(),
        Command::Unknown(cmd) => {
            format!("Unrecognized command: '{}'. Type 'help' for available commands.", cmd)
        }
    }
}

const HELP: &str = "Commands:
  mode <le|so|fa|cn|ca>  - Set the negative mode
  gen <C..B>             - Set the generator (tonic)
  octave <0-10>          - Set the target octave for mode fa
  status                 - Show the current settings
  debug on/off           - Enable/Disable per-note prints
  help/h                 - Show this help
  exit/quit/q            - Exit program";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings() {
        assert_eq!(parse_command("mode fa"), Command::Mode(ReflectionMode::Fa));
        assert_eq!(parse_command("  gen D# "), Command::Generator(PitchClass::DSharp));
        assert_eq!(parse_command("generator F#"), Command::Generator(PitchClass::FSharp));
        assert_eq!(
            parse_command("octave 7"),
            Command::Octave(TargetOctave::new(7).unwrap())
        );
    }

    #[test]
    fn parses_control_words() {
        assert_eq!(parse_command(""), Command::Exit);
        assert_eq!(parse_command("Quit"), Command::Exit);
        assert_eq!(parse_command("h"), Command::Help);
        assert_eq!(parse_command("debug on"), Command::Debug(true));
        assert_eq!(parse_command("DEBUG disable"), Command::Debug(false));
        assert_eq!(parse_command("status"), Command::Status);
    }

    #[test]
    fn bad_values_are_reported() {
        let invalid = |line: &str, text: &str| {
            matches!(parse_command(line), Command::Invalid(m) if m.contains(text))
        };
        assert!(invalid("mode xx", "Mode not recognized"));
        assert!(invalid("gen H", "Generator"));
        assert!(invalid("gen Eb", "Generator"));
        assert!(invalid("octave 12", "Octave"));
        assert_eq!(parse_command("transpose 3"), Command::Unknown("transpose 3".to_string()));
        assert_eq!(parse_command("mode"), Command::Unknown("mode".to_string()));
    }
}
