//! Error types for the device simulator

use std::io;

use thiserror::Error;

/// Errors surfaced by the simulator run loop
///
/// The sequencer itself never fails; everything here comes from the
/// transport behind a [`FrameSink`](crate::FrameSink).
#[derive(Debug, Error)]
pub enum SimError {
    /// The sink failed to emit a frame
    #[error("sink failed to emit {description}: {source}")]
    Sink {
        description: String,
        #[source]
        source: io::Error,
    },

    /// Opening the serial port failed
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}
