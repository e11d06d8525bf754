pub mod input;
pub mod midi_file;
pub mod output;

use crate::error::Result;

/// Choose among port `names`: first substring match (skipping `exclude`),
/// else the only port, else ask on the console.
pub(crate) fn pick_port(
    kind: &str,
    names: &[String],
    name_substr: &str,
    exclude: Option<&str>,
) -> Result<usize> {
    if let Some(idx) = match_port(names, name_substr, exclude) {
        tracing::debug!("{} port matching '{}': {}", kind, name_substr, names[idx]);
        return Ok(idx);
    }

    // Fallbacks: only one port -> choose it, otherwise list and ask
    if names.len() == 1 {
        tracing::debug!("Choosing the only available {} port", kind);
        return Ok(0);
    }
    input::prompt_for_port(kind, names)
}

/// Index of the first name containing `name_substr`. An empty substring never matches.
pub(crate) fn match_port(
    names: &[String],
    name_substr: &str,
    exclude: Option<&str>,
) -> Option<usize> {
    if name_substr.is_empty() {
        return None;
    }
    names
        .iter()
        .position(|name| name.contains(name_substr) && Some(name.as_str()) != exclude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn substring_match_picks_first_hit() {
        let ports = names(&["Midi Through", "MRCC", "MIDIOUT7 (MRCC)"]);
        assert_eq!(match_port(&ports, "MRCC", None), Some(1));
        assert_eq!(match_port(&ports, "MIDIOUT7", None), Some(2));
        assert_eq!(match_port(&ports, "Keystep", None), None);
    }

    #[test]
    fn output_skips_the_input_port_name() {
        let ports = names(&["MRCC", "MIDIOUT7 (MRCC)"]);
        assert_eq!(match_port(&ports, "MRCC", Some("MRCC")), Some(1));
    }

    #[test]
    fn empty_substring_matches_nothing() {
        assert_eq!(match_port(&names(&["a", "b"]), "", None), None);
    }

    #[test]
    fn single_port_is_chosen_without_prompt() {
        assert_eq!(pick_port("input", &names(&["Only"]), "nope", None).unwrap(), 0);
    }
}
