//! Simulated device run loop
//!
//! A single sequential actor: emit one frame, wait the scheduled delay,
//! repeat. There is no cancellation; the loop ends when the requested number
//! of cycles has been emitted, when the sink fails, or when the process is
//! killed.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::SimError;
use crate::sequencer::DeviceSequencer;
use crate::sink::FrameSink;

/// Drive a sequencer into a sink
///
/// Runs `cycles` full cycles, or forever when `None`. Each cycle ends after
/// the wait that follows its last emission. A sink failure stops the loop
/// immediately and is returned without retrying.
///
/// Returns the sequencer so callers can inspect its final state.
pub async fn run_sequencer<S, C>(
    mut sequencer: DeviceSequencer,
    mut sink: S,
    clock: C,
    cycles: Option<u64>,
) -> Result<DeviceSequencer, SimError>
where
    S: FrameSink,
    C: Clock,
{
    match cycles {
        Some(n) => info!("Starting simulated device for {} cycle(s)", n),
        None => info!("Starting simulated device"),
    }

    loop {
        if cycles.is_some_and(|n| sequencer.cycles_completed() >= n) {
            break;
        }

        let step = sequencer.next_step(&clock);
        debug!(
            "Emitting {} ({:?}): {:02X?}, next in {:?}",
            step.description, step.phase, step.frame, step.delay
        );

        if let Err(e) = sink.emit(&step.frame, &step.description) {
            warn!("Sink failed to emit {}: {}", step.description, e);
            return Err(SimError::Sink {
                description: step.description,
                source: e,
            });
        }

        if !step.delay.is_zero() {
            sleep(step.delay).await;
        }
    }

    info!(
        "Simulated device stopped after {} cycle(s), alive counter {}",
        sequencer.cycles_completed(),
        sequencer.alive_counter()
    );
    Ok(sequencer)
}
