pub mod check;
pub mod command;
pub mod forwarder;
pub mod negative;
pub mod pitch;
pub mod stdin_handler;
