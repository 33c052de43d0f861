//! Conversion app: wires the core state machine to the HTTP engine and the
//! terminal.
pub mod platform;
