//! Command-line arguments. `main.rs` only dispatches on these.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::board::sim::DEFAULT_CONVERSION_US;

/// LineLight-1 - audio-reactive lamp controller
#[derive(Parser, Debug)]
#[command(name = "linelight")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the lamp from the sound card line input (default)
    Live {
        #[command(flatten)]
        pots: PotArgs,
    },

    /// Run the controller against a synthetic signal on a virtual clock
    Simulate {
        #[arg(long, value_enum, default_value_t = SignalKind::Tone)]
        signal: SignalKind,

        /// Tone frequency in Hz
        #[arg(long, default_value_t = 3000.0)]
        freq: f64,

        /// Peak amplitude in ADC LSB around the 512 bias
        #[arg(long, default_value_t = 200.0)]
        amplitude: f64,

        /// Noise seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        #[command(flatten)]
        pots: PotArgs,

        /// Virtual seconds to run
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,

        /// Duration of one ADC conversion in microseconds
        #[arg(long, default_value_t = DEFAULT_CONVERSION_US)]
        conversion_us: u32,
    },

    /// Play a WAV file into the line input on a virtual clock
    Replay {
        /// WAV file to play
        wav: PathBuf,

        #[command(flatten)]
        pots: PotArgs,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PotArgs {
    /// Band low edge pot (ADC counts)
    #[arg(long, default_value_t = 511, value_parser = clap::value_parser!(u16).range(0..=1023))]
    pub pot1: u16,

    /// Band width pot (ADC counts)
    #[arg(long, default_value_t = 511, value_parser = clap::value_parser!(u16).range(0..=1023))]
    pub pot2: u16,
}

impl Default for PotArgs {
    fn default() -> Self {
        Self {
            pot1: 511,
            pot2: 511,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Silence,
    Tone,
    Noise,
}
