//! Seat Controller Simulator
//!
//! Emulates the seat controller ECU on the serial bus so a host-side
//! sniffer can be exercised without hardware. Frames are printed to the
//! console by default, or written to a serial port.
//!
//! Stop with Ctrl-C; the process holds nothing that needs cleanup.

mod settings;

use std::path::PathBuf;

use anyhow::Context;
use bus_sim::{
    run_sequencer, ConsoleSink, DeviceSequencer, FrameSink, SerialSink, SystemClock,
};
use clap::Parser;
use settings::{OutputSettings, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated seat controller emitting bus frames
#[derive(Debug, Parser)]
#[command(name = "stm-sim", version, about)]
struct Args {
    /// Settings file (defaults to $XDG_CONFIG_HOME/stm-sim/settings.json)
    #[arg(long, env = "STM_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Write frames to this serial port instead of the console
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for --port
    #[arg(long)]
    baud: Option<u32>,

    /// Stop after this many cycles (runs forever by default)
    #[arg(long)]
    cycles: Option<u64>,

    /// Write the effective settings, with --port and --baud applied, to the
    /// settings file and exit
    #[arg(long)]
    write_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(port) = &self.port {
            let baud_rate = match &settings.output {
                OutputSettings::Serial { baud_rate, .. } => *baud_rate,
                OutputSettings::Console => settings::default_baud(),
            };
            settings.output = OutputSettings::Serial {
                port: port.clone(),
                baud_rate,
            };
        }
        if let (Some(baud), OutputSettings::Serial { baud_rate, .. }) =
            (self.baud, &mut settings.output)
        {
            *baud_rate = baud;
        }
    }
}

fn open_sink(output: &OutputSettings) -> anyhow::Result<Box<dyn FrameSink>> {
    match output {
        OutputSettings::Console => Ok(Box::new(ConsoleSink::stdout())),
        OutputSettings::Serial { port, baud_rate } => {
            let sink = SerialSink::open(port, *baud_rate)
                .with_context(|| format!("Failed to open serial port {}", port))?;
            Ok(Box::new(sink))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stm_sim=info,bus_protocol=info,bus_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().or_else(Settings::settings_path);
    let mut settings = match &config_path {
        Some(path) => Settings::load_from(path),
        None => Settings::default(),
    };
    args.apply(&mut settings);

    if args.write_config {
        let path = config_path.context("Could not determine settings path")?;
        settings.save_to(&path)?;
        tracing::info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    tracing::info!("Starting seat controller simulator ({:?})", settings.output);

    let sink = open_sink(&settings.output)?;
    let sequencer = DeviceSequencer::new(settings.sequencer);
    run_sequencer(sequencer, sink, SystemClock, args.cycles).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_flag_switches_to_serial() {
        let args = Args::parse_from(["stm-sim", "--port", "/dev/ttyACM0"]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(
            settings.output,
            OutputSettings::Serial {
                port: "/dev/ttyACM0".to_string(),
                baud_rate: 115200,
            }
        );
    }

    #[test]
    fn test_baud_flag_overrides_file() {
        let args = Args::parse_from(["stm-sim", "--baud", "9600"]);
        let mut settings = Settings {
            output: OutputSettings::Serial {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115200,
            },
            ..Default::default()
        };
        args.apply(&mut settings);
        assert_eq!(
            settings.output,
            OutputSettings::Serial {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
            }
        );
    }

    #[test]
    fn test_baud_ignored_for_console() {
        let args = Args::parse_from(["stm-sim", "--baud", "9600", "--cycles", "2"]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.output, OutputSettings::Console);
        assert_eq!(args.cycles, Some(2));
    }

    #[test]
    fn test_write_config_keeps_overrides() {
        let args = Args::parse_from(["stm-sim", "--write-config", "--port", "COM4"]);
        assert!(args.write_config);

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(
            settings.output,
            OutputSettings::Serial {
                port: "COM4".to_string(),
                baud_rate: 115200,
            }
        );

        assert!(Args::try_parse_from(["stm-sim", "--write-default-config"]).is_err());
    }

    #[test]
    fn test_console_sink_opens() {
        assert!(open_sink(&OutputSettings::Console).is_ok());
    }
}
