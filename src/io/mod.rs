//! Audio I/O modules
//!
//! Audio decoding with Symphonia and Standard MIDI File export.

pub mod decoder;
pub mod midi;
