//! Simulated device state machine
//!
//! One cycle of the device emits, in order:
//!
//! ```text
//! Alive                    (no wait)
//! Status Idle              wait idle_to_moving
//! Status Moving            wait moving_to_ack
//! Ack ControlRequest       wait ack_to_idle
//! Status Idle              wait idle_to_error
//! Status Error(code)       wait error_to_idle
//! Status Idle              wait idle_after_error
//! ```
//!
//! and then starts over. The sequencer only decides *what* goes out next
//! and how long to wait afterwards; [`run_sequencer`](crate::run_sequencer)
//! does the waiting and the emitting.

use std::time::Duration;

use bus_protocol::{AlivePayload, EncodeCommand, Message, MessageKind, StatusPayload};
use tracing::trace;

use crate::clock::Clock;
use crate::config::SequencerConfig;

/// What the device last announced on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Moving,
    AwaitingAck,
    Error,
}

/// Position in the cycle; names the emission that happens next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Alive announcement opening every cycle
    CycleStart,
    Idle,
    Moving,
    AwaitingAck,
    IdleAfterAck,
    Error,
    IdleAfterError,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Phase {
        match self {
            Phase::CycleStart => Phase::Idle,
            Phase::Idle => Phase::Moving,
            Phase::Moving => Phase::AwaitingAck,
            Phase::AwaitingAck => Phase::IdleAfterAck,
            Phase::IdleAfterAck => Phase::Error,
            Phase::Error => Phase::IdleAfterError,
            Phase::IdleAfterError => Phase::CycleStart,
        }
    }

    /// Device state announced by this phase's emission
    ///
    /// `None` for the Alive announcement, which leaves the state unchanged.
    pub fn announced(self) -> Option<SequencerState> {
        match self {
            Phase::CycleStart => None,
            Phase::Idle | Phase::IdleAfterAck | Phase::IdleAfterError => {
                Some(SequencerState::Idle)
            }
            Phase::Moving => Some(SequencerState::Moving),
            Phase::AwaitingAck => Some(SequencerState::AwaitingAck),
            Phase::Error => Some(SequencerState::Error),
        }
    }

    /// Wait that follows this phase's emission
    pub fn delay(self, config: &SequencerConfig) -> Duration {
        match self {
            Phase::CycleStart => Duration::ZERO,
            Phase::Idle => config.idle_to_moving_delay(),
            Phase::Moving => config.moving_to_ack_delay(),
            Phase::AwaitingAck => config.ack_to_idle_delay(),
            Phase::IdleAfterAck => config.idle_to_error_delay(),
            Phase::Error => config.error_to_idle_delay(),
            Phase::IdleAfterError => config.idle_after_error_delay(),
        }
    }
}

/// One scheduled emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Phase that produced this step
    pub phase: Phase,
    /// Message being sent
    pub message: Message,
    /// Encoded frame
    pub frame: Vec<u8>,
    /// Human-readable label for the sink
    pub description: String,
    /// Wait before the next step
    pub delay: Duration,
}

/// Timed state machine driving the simulated device
///
/// Created with counter 0 and state Idle. The Alive counter increases by one
/// on every Alive emission and is never reset.
#[derive(Debug)]
pub struct DeviceSequencer {
    config: SequencerConfig,
    phase: Phase,
    state: SequencerState,
    alive_counter: u64,
    cycles_completed: u64,
}

impl DeviceSequencer {
    /// Create a sequencer at the start of its first cycle
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            phase: Phase::CycleStart,
            state: SequencerState::Idle,
            alive_counter: 0,
            cycles_completed: 0,
        }
    }

    /// Schedule configuration
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Phase whose emission comes next
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// State the device last announced
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Counter value the next Alive frame will carry (before truncation)
    pub fn alive_counter(&self) -> u64 {
        self.alive_counter
    }

    /// Number of full cycles emitted so far
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Produce the next emission and advance the state machine
    pub fn next_step(&mut self, clock: &impl Clock) -> Step {
        let phase = self.phase;

        let (message, description) = match phase {
            Phase::CycleStart => {
                let payload = AlivePayload::new(clock.unix_seconds(), self.alive_counter);
                self.alive_counter += 1;
                (Message::Alive(payload), "Alive".to_string())
            }
            Phase::Idle | Phase::IdleAfterAck => (
                Message::Status(StatusPayload::idle()),
                "Status IDLE".to_string(),
            ),
            Phase::Moving => (
                Message::Status(StatusPayload::moving()),
                "Status MOVING".to_string(),
            ),
            Phase::AwaitingAck => (
                Message::ack(MessageKind::ControlRequest),
                "ACK ControlReq".to_string(),
            ),
            Phase::Error => (
                Message::Status(StatusPayload::error(self.config.error_code)),
                format!("Status ERROR (code={})", self.config.error_code),
            ),
            Phase::IdleAfterError => (
                Message::Status(StatusPayload::idle()),
                "Status IDLE after clear".to_string(),
            ),
        };

        if let Some(state) = phase.announced() {
            self.state = state;
        }
        if phase == Phase::IdleAfterError {
            self.cycles_completed += 1;
        }
        self.phase = phase.next();

        trace!("Sequencer {:?} -> {:?}", phase, self.phase);

        Step {
            phase,
            frame: message.encode(),
            message,
            description,
            delay: phase.delay(&self.config),
        }
    }

    /// Produce every remaining step of the current cycle
    pub fn next_cycle(&mut self, clock: &impl Clock) -> Vec<Step> {
        let mut steps = Vec::with_capacity(7);
        loop {
            let step = self.next_step(clock);
            let done = step.phase == Phase::IdleAfterError;
            steps.push(step);
            if done {
                return steps;
            }
        }
    }
}
