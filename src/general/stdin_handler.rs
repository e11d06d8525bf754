use std::io::stdin;
use std::sync::atomic::Ordering;
use std::thread;

use crate::general::command::{apply_command, parse_command, Command};

/// Spawn a thread that reads console commands and updates the live settings.
/// An empty line or 'exit' sets the global `EXIT_FLAG`.
pub fn spawn_stdin_handler() -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                // EOF behaves like an empty line
                Ok(0) => {
                    crate::EXIT_FLAG.store(true, Ordering::SeqCst);
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("stdin read failed: {}", err);
                    break;
                }
            }

            let command = parse_command(&line);
            let reply = apply_command(&command);
            match command {
                Command::Invalid(_) | Command::Unknown(_) => eprintln!("{}", reply),
                _ => println!("{}", reply),
            }
            if command == Command::Exit {
                break;
            }
        }
    })
}
