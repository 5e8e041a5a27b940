//! End-to-end runs of the controller on the simulated board.

use std::f64::consts::PI;

use pretty_assertions::assert_eq;

use super::*;
use crate::board::sim::{ARDUINO_CONVERSION_US, Noise, Silence, SimBoard, Tone};
use crate::board::Timer1;
use crate::config::{AGC_MAX, AGC_MIN, SAMPLE_RATE_HZ};

const TONE_HZ: f64 = 2000.0;
/// Loud enough that the band energy (~2.9e6 at N = 128) keeps `ema * gain`
/// clamped at 1.0 even at `AGC_MIN`: the lamp sits at full scale.
const TONE_LSB: f64 = 200.0;

/// Smallest knob settings that select `lo..=hi`.
fn pots_for(lo: usize, hi: usize, nyquist: usize) -> (u16, u16) {
    for p1 in 0..=1023 {
        for p2 in 0..=1023 {
            let band = BandSelection::from_pots(p1, p2, nyquist);
            if band.lo() == lo && band.hi() == hi {
                return (p1, p2);
            }
        }
    }
    panic!("no pot setting selects {lo}-{hi}");
}

fn booted<const N: usize>(board: &mut SimBoard) -> (LampController<N>, Timer1) {
    let mut pwm = Timer1::new();
    pwm.configure_phase_correct_8bit();
    let mut controller = LampController::<N>::new();
    controller.boot(board, &mut pwm);
    (controller, pwm)
}

#[test]
fn test_silence_keeps_lamp_dark() {
    let mut board = SimBoard::new(Silence);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let mut last_gain = controller.agc_gain();
    for _ in 0..100 {
        let report = controller.run_frame(&mut board, &mut pwm);
        assert_eq!(report.energy, 0.0);
        assert_eq!(report.duty, 0);
        assert!(report.gain >= last_gain && report.gain <= AGC_MAX);
        last_gain = report.gain;
    }

    assert_eq!(pwm.duty(), 0);
    assert_eq!(controller.ema_energy(), 0.0);
    // climbing towards the ceiling: 1.00525^100
    assert!(controller.agc_gain() > 1.6);
}

#[test]
fn test_in_band_tone_drives_lamp_high_and_steady() {
    let (p1, p2) = pots_for(20, 40, 63);
    let mut board = SimBoard::new(Tone::new(TONE_HZ, TONE_LSB)).with_pots(p1, p2);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let duties: Vec<u8> = (0..60)
        .map(|_| controller.run_frame(&mut board, &mut pwm).duty)
        .collect();

    let settled = &duties[30..];
    let lo = *settled.iter().min().unwrap();
    let hi = *settled.iter().max().unwrap();
    assert!(lo > 128, "{duties:?}");
    assert!(hi - lo <= 8, "{duties:?}");
    assert!(duties.iter().all(|&d| d == 255), "{duties:?}");
    assert_eq!(pwm.duty(), duties[59]);
}

/// Clean in-band tone on bin 30, quiet enough for the AGC to pull the lamp
/// up to `TARGET_LEVEL` from below without ever clipping.
#[test]
fn test_quiet_in_band_tone_settles_on_target_level() {
    let (p1, p2) = pots_for(20, 40, 63);
    let mut board = SimBoard::new(Silence).with_pots(p1, p2);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let mut duties = Vec::new();
    for _ in 0..1200 {
        let tone = (0..128).map(|n| 0.06 * (2.0 * PI * 30.0 * n as f64 / 128.0).sin());
        controller.load_analog_frame(tone);
        duties.push(controller.process(&mut board, &mut pwm).duty);
    }

    assert!(duties.iter().all(|&d| d > 0 && d < 255), "{duties:?}");
    assert!(duties.windows(2).all(|w| w[1] >= w[0]), "{duties:?}");
    assert!(duties[0] < duties[20] && duties[20] < duties[300], "{duties:?}");
    // round(0.35 * 255)
    assert!(duties[900..].iter().all(|&d| d == 89), "{:?}", &duties[900..]);
    assert!(controller.agc_gain() > 1.0);
}

/// Only window leakage reaches bins 50-60 (energy ~0.0017). The lamp stays
/// dark for several seconds, then the AGC slowly lifts even that leakage
/// towards the target.
#[test]
fn test_out_of_band_tone_dark_until_agc_lifts_leakage() {
    let (p1, p2) = pots_for(50, 60, 63);
    let mut board = SimBoard::new(Silence).with_pots(p1, p2);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let fs = f64::from(SAMPLE_RATE_HZ);
    let mut duties = Vec::new();
    for frame in 0..3000 {
        let tone = (0..128).map(|n| {
            let t = (frame * 128 + n) as f64 / fs;
            TONE_LSB * (2.0 * PI * TONE_HZ * t).sin()
        });
        controller.load_analog_frame(tone);
        duties.push(controller.process(&mut board, &mut pwm).duty);
    }

    assert!(duties[..300].iter().all(|&d| d < 8), "{:?}", &duties[..300]);
    assert!(duties[2999] > 60, "{}", duties[2999]);
    assert!(duties[2999] < 255);
}

/// On the 10-bit board, quantisation leaves ~440 in bins 50-60. That is
/// over 20x full scale even at the gain floor, so the lamp saturates.
#[test]
fn test_out_of_band_tone_saturates_on_quantized_adc() {
    let (p1, p2) = pots_for(50, 60, 63);
    let mut board = SimBoard::new(Tone::new(TONE_HZ, TONE_LSB)).with_pots(p1, p2);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    for _ in 0..400 {
        let report = controller.run_frame(&mut board, &mut pwm);
        assert!(report.energy > 1.0 / AGC_MIN, "energy {}", report.energy);
        assert_eq!(report.duty, 255);
    }
    assert_eq!(controller.agc_gain(), AGC_MIN);
}

#[test]
fn test_out_of_band_energy_far_below_in_band() {
    let in_band = pots_for(20, 40, 63);
    let out_band = pots_for(50, 60, 63);

    let mut board = SimBoard::new(Tone::new(TONE_HZ, TONE_LSB));
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    board.set_pots(in_band.0, in_band.1);
    let inside = controller.run_frame(&mut board, &mut pwm).energy;
    board.set_pots(out_band.0, out_band.1);
    let outside = controller.run_frame(&mut board, &mut pwm).energy;

    // quantisation and sampling jitter put a little energy everywhere
    assert!(outside > 0.0);
    assert!(inside > 1000.0 * outside, "inside {inside}, outside {outside}");
}

#[test]
fn test_step_from_silence_to_tone() {
    let (p1, p2) = pots_for(20, 40, 63);
    let mut board = SimBoard::new(Silence).with_pots(p1, p2);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    for _ in 0..50 {
        assert_eq!(controller.run_frame(&mut board, &mut pwm).duty, 0);
    }

    board.set_signal(Tone::new(TONE_HZ, TONE_LSB));
    let duties: Vec<u8> = (0..80)
        .map(|_| controller.run_frame(&mut board, &mut pwm).duty)
        .collect();

    assert!(duties[..10].windows(2).all(|w| w[1] >= w[0]), "{duties:?}");
    // full scale from the first loud frame
    assert_eq!(duties[0], 255);

    let steady = f64::from(duties[79]);
    let at_40 = f64::from(duties[39]);
    assert!((at_40 - steady).abs() <= 0.1 * steady, "{duties:?}");
}

#[test]
fn test_pot_extremes_select_edge_bands() {
    let mut board = SimBoard::new(Silence).with_pots(1023, 0);
    let (mut controller, mut pwm) = booted::<128>(&mut board);
    let band = controller.run_frame(&mut board, &mut pwm).band;
    assert_eq!((band.lo(), band.hi()), (62, 63));

    board.set_pots(0, 1023);
    let band = controller.run_frame(&mut board, &mut pwm).band;
    assert_eq!((band.lo(), band.hi()), (1, 63));

    let mut board = SimBoard::new(Silence).with_pots(1023, 0);
    let (mut controller, mut pwm) = booted::<256>(&mut board);
    let band = controller.run_frame(&mut board, &mut pwm).band;
    assert_eq!((band.lo(), band.hi()), (126, 127));
}

#[test]
fn test_trace_rate_over_ten_seconds() {
    let mut board = SimBoard::new(Tone::new(TONE_HZ, TONE_LSB));
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let mut traced = 0;
    while board.now_us() < 10_000_000 {
        if controller.run_frame(&mut board, &mut pwm).traced {
            traced += 1;
        }
    }

    assert!((9..=11).contains(&traced), "traced {traced}");

    let lines = board.serial_lines();
    assert_eq!(&lines[..3], ["LineLight-1 boot", "Fs=9600", "N=128"]);
    assert_eq!(lines.len(), 3 + traced);
    assert!(lines[3..].iter().all(|l| l.starts_with("bins 31-47 (2325-3525 Hz) level ")));
}

#[test]
fn test_identical_inputs_give_identical_duties() {
    let run = || {
        let mut board = SimBoard::new(Noise::new(9, 120.0)).with_pots(400, 600);
        let (mut controller, mut pwm) = booted::<128>(&mut board);
        (0..50)
            .map(|_| controller.run_frame(&mut board, &mut pwm).duty)
            .collect::<Vec<u8>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_slow_adc_still_tracks_tone() {
    let (p1, p2) = pots_for(20, 40, 63);
    let mut board = SimBoard::new(Tone::new(TONE_HZ, TONE_LSB))
        .with_pots(p1, p2)
        .with_conversion_us(ARDUINO_CONVERSION_US);
    let (mut controller, mut pwm) = booted::<128>(&mut board);

    let report = (0..20)
        .map(|_| controller.run_frame(&mut board, &mut pwm))
        .last()
        .unwrap();
    assert!(report.timing.late_samples > 0);
    assert!(report.timing.effective_rate_hz() < f64::from(SAMPLE_RATE_HZ));
    assert_eq!(report.duty, 255);
}

#[test]
fn test_boot_turns_lamp_off() {
    let mut board = SimBoard::new(Silence);
    let mut pwm = Timer1::new();
    pwm.write_duty(180);
    let mut controller = LampController::<128>::new();
    controller.boot(&mut board, &mut pwm);
    assert_eq!(pwm.duty(), 0);
    assert_eq!(board.serial_lines().len(), 3);
}
