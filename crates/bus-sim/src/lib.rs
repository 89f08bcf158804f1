//! Seat Controller Device Simulation Library
//!
//! This crate emulates the seat controller ECU end of the serial bus so a
//! host-side sniffer can be exercised without physical hardware. It includes:
//!
//! - **DeviceSequencer**: the timed state machine that decides which frame
//!   goes out next and how long to wait afterwards
//! - **FrameSink**: where encoded frames go (console, serial port, memory)
//! - **run_sequencer**: the async loop that drives a sequencer into a sink
//!
//! # Example
//!
//! ```rust
//! use bus_sim::{DeviceSequencer, FixedClock, SequencerConfig};
//!
//! let mut sequencer = DeviceSequencer::new(SequencerConfig::immediate());
//! let clock = FixedClock(1_700_000_000);
//!
//! // The first step of every cycle is the Alive announcement
//! let step = sequencer.next_step(&clock);
//! assert_eq!(step.description, "Alive");
//! assert_eq!(sequencer.alive_counter(), 1);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod sequencer;
pub mod sink;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SequencerConfig;
pub use error::SimError;
pub use sequencer::{DeviceSequencer, Phase, SequencerState, Step};
pub use sink::{ConsoleSink, FrameSink, RecordingSink, SerialSink};
pub use task::run_sequencer;
