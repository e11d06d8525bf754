use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::config::OscConfig;
use crate::general::command::{apply_command, Command};
use crate::general::check::OSC_LISTENER_RUNNING;
use crate::general::negative::{ReflectionMode, TargetOctave};
use crate::general::pitch::PitchClass;

/// Spawns a background thread that listens for OSC on the configured address.
/// Recognizes the configured mode, generator and octave paths and updates the
/// live settings accordingly.
/// The thread checks `crate::EXIT_FLAG` periodically to shut down gracefully.
pub fn spawn_osc_listener() -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let config = &crate::get_config().osc;

        let bind_addr = format!("{}:{}", config.listening_host, config.listening_port);
        let socket = match UdpSocket::bind(&bind_addr) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!("OSC bind failed on {}: {}", bind_addr, err);
                return;
            }
        };

        // Set socket timeout so we can check EXIT_FLAG periodically
        if let Err(err) = socket.set_read_timeout(Some(Duration::from_millis(200))) {
            tracing::warn!("OSC socket timeout not set: {}", err);
        }
        OSC_LISTENER_RUNNING.store(true, Ordering::SeqCst);
        tracing::debug!(
            "OSC listener bound on {} (paths: {}, {}, {})",
            bind_addr,
            config.mode_path,
            config.generator_path,
            config.octave_path
        );

        let mut buf = [0u8; decoder::MTU];
        while !crate::EXIT_FLAG.load(Ordering::SeqCst) {
            match socket.recv_from(&mut buf) {
                Ok((size, peer_addr)) => match decoder::decode_udp(&buf[..size]) {
                    Ok((_, packet)) => handle_packet(packet, config),
                    Err(err) => tracing::warn!("OSC decode error from {}: {}", peer_addr, err),
                },
                Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue;
                }
                Err(err) => tracing::warn!("OSC recv error: {}", err),
            }
        }

        tracing::debug!("OSC listener exiting");
        OSC_LISTENER_RUNNING.store(false, Ordering::SeqCst);
    })
}

fn handle_packet(packet: OscPacket, config: &OscConfig) {
    match packet {
        OscPacket::Message(msg) => {
            if let Some(command) = command_from_message(&msg, config) {
                let reply = apply_command(&command);
                match command {
                    Command::Invalid(_) => tracing::warn!("[OSC] {}", reply),
                    _ => tracing::info!("[OSC] {}", reply),
                }
            }
        }
        // Process all messages in the bundle
        OscPacket::Bundle(bundle) => {
            for pkt in bundle.content {
                handle_packet(pkt, config);
            }
        }
    }
}

fn int_arg(arg: &OscType) -> Option<i64> {
    match *arg {
        OscType::Int(v) => Some(v as i64),
        OscType::Long(v) => Some(v),
        OscType::Float(v) => Some(v.round() as i64),
        OscType::Double(v) => Some(v.round() as i64),
        _ => None,
    }
}

/// Map one OSC message onto a live command. Unknown paths yield `None`.
///
/// Mode accepts its name or an index (le=0 .. ca=4), generator a label or a
/// pitch class number, octave any number.
pub fn command_from_message(msg: &OscMessage, config: &OscConfig) -> Option<Command> {
    let addr = msg.addr.as_str();
    if addr != config.mode_path && addr != config.generator_path && addr != config.octave_path {
        return None;
    }
    let Some(arg) = msg.args.first() else {
        return Some(Command::Invalid(format!("{} without argument ignored", addr)));
    };

    let command = if addr == config.mode_path {
        let mode = match arg {
            OscType::String(s) => s.parse::<ReflectionMode>().ok(),
            other => int_arg(other)
                .and_then(|v| u8::try_from(v).ok())
                .and_then(ReflectionMode::from_index),
        };
        mode.map(Command::Mode)
    } else if addr == config.generator_path {
        let generator = match arg {
            OscType::String(s) => s.parse::<PitchClass>().ok(),
            other => int_arg(other)
                .filter(|v| (0..12).contains(v))
                .map(|v| PitchClass::from_index(v as u8)),
        };
        generator.map(Command::Generator)
    } else {
        int_arg(arg)
            .and_then(|v| TargetOctave::try_from(v).ok())
            .map(Command::Octave)
    };

    Some(command.unwrap_or_else(|| {
        Command::Invalid(format!("{} got unusable argument {:?}", addr, arg))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[test]
    fn mode_by_name_or_index() {
        let config = OscConfig::default();
        let by_name = message("/negative/mode", vec![OscType::String("cn".to_string())]);
        assert_eq!(
            command_from_message(&by_name, &config),
            Some(Command::Mode(ReflectionMode::Cn))
        );
        let by_index = message("/negative/mode", vec![OscType::Int(2)]);
        assert_eq!(
            command_from_message(&by_index, &config),
            Some(Command::Mode(ReflectionMode::Fa))
        );
    }

    #[test]
    fn generator_and_octave() {
        let config = OscConfig::default();
        let generator = message("/negative/generator", vec![OscType::String("G#".to_string())]);
        assert_eq!(
            command_from_message(&generator, &config),
            Some(Command::Generator(PitchClass::GSharp))
        );
        let generator = message("/negative/generator", vec![OscType::Float(7.0)]);
        assert_eq!(
            command_from_message(&generator, &config),
            Some(Command::Generator(PitchClass::G))
        );
        let octave = message("/negative/octave", vec![OscType::Double(5.2)]);
        assert_eq!(
            command_from_message(&octave, &config),
            Some(Command::Octave(TargetOctave::new(5).unwrap()))
        );
    }

    #[test]
    fn bad_arguments_and_foreign_paths() {
        let config = OscConfig::default();
        let octave = message("/negative/octave", vec![OscType::Int(11)]);
        assert!(matches!(command_from_message(&octave, &config), Some(Command::Invalid(_))));
        let empty = message("/negative/mode", vec![]);
        assert!(matches!(command_from_message(&empty, &config), Some(Command::Invalid(_))));
        let other = message("/transpose", vec![OscType::Int(3)]);
        assert_eq!(command_from_message(&other, &config), None);
    }
}
