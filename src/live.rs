//! Live negative harmony between two MIDI ports.

use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use midir::{Ignore, MidiInput, MidiOutput};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::general::{check, forwarder, stdin_handler};
use crate::general::negative::Reflector;
use crate::io::{input, output};
use crate::remote::osc_listener;

/// Forward MIDI from the configured input port to the output port, negating
/// notes with the live settings, until the console asks to exit.
pub fn run_live(config: &Config, reflector: &Reflector) -> Result<()> {
    crate::set_live_reflector(reflector);
    crate::EXIT_FLAG.store(false, Ordering::SeqCst);

    let mut midi_in = MidiInput::new("negative-harmony input")
        .map_err(|err| Error::Port(format!("cannot open MIDI input: {}", err)))?;
    midi_in.ignore(Ignore::None);
    let midi_out = MidiOutput::new("negative-harmony output")
        .map_err(|err| Error::Port(format!("cannot open MIDI output: {}", err)))?;

    let in_port = input::choose_input_port(&midi_in, &config.midi.input_port)?;
    let in_port_name = midi_in
        .port_name(&in_port)
        .map_err(|err| Error::Port(err.to_string()))?;
    let out_port = output::choose_output_port(&midi_out, &config.midi.output_port, &in_port_name)?;
    // Resolve the name before connecting (connect takes ownership of midi_out)
    let out_port_name = midi_out
        .port_name(&out_port)
        .map_err(|err| Error::Port(err.to_string()))?;

    let (tx, rx) = channel::<Vec<u8>>();
    let conn_out = midi_out
        .connect(&out_port, "negative-harmony-forward")
        .map_err(|err| Error::Port(format!("cannot connect to '{}': {}", out_port_name, err)))?;
    let forward_handle = forwarder::spawn_forwarder(conn_out, rx);

    // Forward raw bytes so pitch bend, pedals and clock pass through untouched
    let conn_in = midi_in
        .connect(
            &in_port,
            "negative-harmony-read",
            move |_stamp, message, _| {
                let _ = tx.send(message.to_vec());
            },
            (),
        )
        .map_err(|err| Error::Port(format!("cannot connect to '{}': {}", in_port_name, err)))?;

    let osc_handle = if config.osc.enabled {
        let handle = osc_listener::spawn_osc_listener();
        // Small delay so the listener can bind before the banner reports it
        thread::sleep(Duration::from_millis(300));
        Some(handle)
    } else {
        None
    };

    check::print_live_started(&in_port_name, &out_port_name);
    let stdin_handle = stdin_handler::spawn_stdin_handler();

    while !crate::EXIT_FLAG.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("Closing connections and exiting...");
    // Dropping the input connection drops the sender, which ends the forwarder
    let _ = conn_in.close();
    let _ = forward_handle.join();
    if let Some(handle) = osc_handle {
        let _ = handle.join();
    }
    let _ = stdin_handle.join();
    Ok(())
}
