mod app;
mod audio;
mod board;
mod cli;
mod config;
mod controller;
mod dsp;
mod error;
mod trace;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::{NativeOptions, egui};

use app::LineLightApp;
use board::sim::{Noise, Recording, Silence, Tone};
use board::{SimBoard, Timer1};
use cli::{Cli, Commands, PotArgs, SignalKind};
use config::F_CPU_HZ;
use controller::LineLight;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Live {
        pots: PotArgs::default(),
    }) {
        Commands::Live { pots } => run_live(pots),
        Commands::Simulate {
            signal,
            freq,
            amplitude,
            seed,
            pots,
            seconds,
            conversion_us,
        } => {
            let board = match signal {
                SignalKind::Silence => SimBoard::new(Silence),
                SignalKind::Tone => SimBoard::new(Tone::new(freq, amplitude)),
                SignalKind::Noise => SimBoard::new(Noise::new(seed, amplitude)),
            }
            .with_conversion_us(conversion_us);

            log::info!("Simulating {signal:?} for {seconds} s");
            run_headless(board, pots, (seconds.max(0.0) * 1e6) as u64);
            Ok(())
        }
        Commands::Replay { wav, pots } => {
            let recording = Recording::open(&wav)
                .with_context(|| format!("Failed to load {}", wav.display()))?;
            let duration_us = recording.duration_us();

            log::info!("Replaying {}", wav.display());
            run_headless(SimBoard::new(recording), pots, duration_us);
            Ok(())
        }
    }
}

fn run_live(pots: PotArgs) -> anyhow::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "LineLight-1",
        options,
        Box::new(move |cc| Ok(Box::new(LineLightApp::new(cc, pots.pot1, pots.pot2)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start application: {e}"))
}

/// Run the controller on the virtual clock until `duration_us` has passed,
/// echoing the serial port to stdout.
fn run_headless(board: SimBoard, pots: PotArgs, duration_us: u64) {
    let mut board = board.with_pots(pots.pot1, pots.pot2).with_echo(true);
    let mut timer = Timer1::new();
    timer.configure_phase_correct_8bit();

    let mut controller = LineLight::new();
    controller.boot(&mut board, &mut timer);

    let mut frames = 0u64;
    let mut duty_sum = 0u64;
    let mut peak_duty = 0u8;
    let mut late_samples = 0u64;
    let mut rate_sum = 0.0;

    while board.now_us() < duration_us {
        let report = controller.run_frame(&mut board, &mut timer);
        frames += 1;
        duty_sum += u64::from(report.duty);
        peak_duty = peak_duty.max(report.duty);
        late_samples += u64::from(report.timing.late_samples);
        rate_sum += report.timing.effective_rate_hz();
    }

    if frames == 0 {
        log::warn!("No frames ran");
        return;
    }

    log::info!(
        "{frames} frames in {:.2} s, duty mean {:.1} peak {peak_duty}, final {}",
        board.now_us() as f64 * 1e-6,
        duty_sum as f64 / frames as f64,
        timer.duty()
    );
    log::info!(
        "Sampling at {:.0} Hz effective, {late_samples} late samples; AGC gain {:.3}, PWM {:.0} Hz",
        rate_sum / frames as f64,
        controller.agc_gain(),
        timer.frequency_hz(F_CPU_HZ).unwrap_or(0.0)
    );
}
