use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::io::midi_file::NegateOutcome;

// Set while the OSC control thread is bound and listening
pub static OSC_LISTENER_RUNNING: AtomicBool = AtomicBool::new(false);

fn print_colored(color: Color, line: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
    let _ = writeln!(&mut stdout, "{}", line);
    let _ = stdout.reset();
}

// Print the quick help line in blue (works on Windows CMD via termcolor)
pub fn print_quick_help() {
    print_colored(Color::Blue, "Type 'help' for commands, 'exit' to quit");
}

/// Final banner after a file transform.
pub fn print_completed(outcome: &NegateOutcome) {
    print_colored(Color::Green, "*** Process completed! ***");
    println!(
        "{} -> {} ({} notes reflected, {} drum notes kept)",
        outcome.input.display(),
        outcome.output.display(),
        outcome.stats.reflected,
        outcome.stats.drums
    );
    if outcome.stats.fallbacks > 0 {
        print_colored(
            Color::Yellow,
            &format!(
                "{} note(s) left the MIDI range and were set to pitch {}",
                outcome.stats.fallbacks,
                crate::FALLBACK_PITCH
            ),
        );
    }
}

pub fn print_failed(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_intense(true));
    let _ = writeln!(&mut stderr, "Error: {}", message);
    let _ = stderr.reset();
}

/// Banner once live forwarding is up.
pub fn print_live_started(in_port: &str, out_port: &str) {
    print_colored(
        Color::Green,
        &format!("Connections active | negating '{}' -> '{}'", in_port, out_port),
    );
    println!("Current settings: {}", crate::live_reflector());
    if OSC_LISTENER_RUNNING.load(Ordering::SeqCst) {
        let osc = &crate::get_config().osc;
        println!(
            "OSC control on {}:{} ({}, {}, {})",
            osc.listening_host,
            osc.listening_port,
            osc.mode_path,
            osc.generator_path,
            osc.octave_path
        );
    }
    print_quick_help();
}
