use std::io::{stdin, stdout, Write};

use crate::error::{Error, Result};

/// Select a MIDI input port. First tries to find a port whose name contains
/// `name_substr`. If no match is found and there are multiple ports,
/// prompts the user to choose one interactively.
pub fn choose_input_port(
    midi_in: &midir::MidiInput,
    name_substr: &str,
) -> Result<midir::MidiInputPort> {
    let ports = midi_in.ports();
    if ports.is_empty() {
        return Err(Error::Port("no input port found".to_string()));
    }
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_else(|_| "<unknown>".to_string()))
        .collect();

    let idx = super::pick_port("input", &names, name_substr, None)?;
    tracing::info!("Using input port: {}", names[idx]);
    Ok(ports[idx].clone())
}

/// Ask on the console for one of `names`; returns its index.
pub(crate) fn prompt_for_port(kind: &str, names: &[String]) -> Result<usize> {
    println!("\nAvailable {} ports:", kind);
    for (i, name) in names.iter().enumerate() {
        println!("{}: {}", i, name);
    }

    print!("Please select {} port: ", kind);
    let mut choice = String::new();
    stdout()
        .flush()
        .and_then(|_| stdin().read_line(&mut choice))
        .map_err(|err| Error::Port(format!("reading {} port choice failed: {}", kind, err)))?;
    match choice.trim().parse::<usize>() {
        Ok(idx) if idx < names.len() => Ok(idx),
        _ => Err(Error::Port(format!("invalid {} port selected", kind))),
    }
}
