//! Output sinks for encoded frames
//!
//! A sink stands in for the physical transport. It is called once per
//! emission, synchronously, before the sequencer waits for its next step.

use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::SimError;

/// Receives every frame the simulated device emits
pub trait FrameSink {
    /// Emit one encoded frame
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()> {
        (**self).emit(frame, description)
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()> {
        (**self).emit(frame, description)
    }
}

/// Format bytes as lowercase hex separated by spaces (`7e 20 01 7f`)
pub fn hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints each frame as a line of text instead of transmitting it
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    /// Print to standard output
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Print to any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for ConsoleSink<W> {
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()> {
        writeln!(self.out, "[SIM] Sent {}: {}", description, hex_bytes(frame))?;
        self.out.flush()
    }
}

/// Writes frames to a serial port
pub struct SerialSink {
    port_name: String,
    port: Box<dyn SerialPort>,
}

impl SerialSink {
    /// Open a serial port for writing frames
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, SimError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;

        debug!("Opened serial sink {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port_name: port_name.to_string(),
            port,
        })
    }

    /// Name of the underlying port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl FrameSink for SerialSink {
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        debug!("Wrote {} to {}: {:02X?}", description, self.port_name, frame);
        Ok(())
    }
}

/// Keeps every emission in memory, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    emissions: Vec<(Vec<u8>, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(frame, description)` pairs
    pub fn emissions(&self) -> &[(Vec<u8>, String)] {
        &self.emissions
    }

    /// Recorded frames only
    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.emissions.iter().map(|(frame, _)| frame.as_slice())
    }

    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    pub fn clear(&mut self) {
        self.emissions.clear();
    }
}

impl FrameSink for RecordingSink {
    fn emit(&mut self, frame: &[u8], description: &str) -> io::Result<()> {
        self.emissions.push((frame.to_vec(), description.to_string()));
        Ok(())
    }
}
