//! Result aggregation modules
//!
//! Assembles the segmented note events into the final transcription:
//! - Note event and melody types
//! - Transcription outcome (melody vs. no voiced signal)
//! - Metadata

pub mod result;
