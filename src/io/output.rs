use crate::error::{Error, Result};

/// Select a MIDI output port. Prefers a port whose name contains
/// `name_substr` and is not identical to `in_port_name`, so a device is
/// never looped back into itself.
pub fn choose_output_port(
    midi_out: &midir::MidiOutput,
    name_substr: &str,
    in_port_name: &str,
) -> Result<midir::MidiOutputPort> {
    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err(Error::Port("no output port found".to_string()));
    }
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "<unknown>".to_string()))
        .collect();

    let idx = super::pick_port("output", &names, name_substr, Some(in_port_name))?;
    tracing::info!("Using output port: {}", names[idx]);
    Ok(ports[idx].clone())
}
