use eframe::egui;

use crate::config::ADC_MAX;
use crate::controller::FrameReport;
use crate::dsp::BandSelection;

/// The two knobs as vertical sliders, with the band they select underneath.
pub fn draw_pot_sliders(ui: &mut egui::Ui, pots: &mut [u16; 2], nyquist: usize, bin_hz: f64) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        for (pot, label) in pots.iter_mut().zip(["Low edge", "Width"]) {
            ui.vertical(|ui| {
                let response = ui.add(
                    egui::Slider::new(pot, 0..=ADC_MAX)
                        .orientation(egui::SliderOrientation::Vertical)
                        .text(""),
                );
                changed |= response.changed();
                ui.label(label);
            });
        }
    });

    let band = BandSelection::from_pots(pots[0], pots[1], nyquist);
    ui.label(format!(
        "bins {band}  ({:.0}-{:.0} Hz)",
        band.lo() as f64 * bin_hz,
        band.hi() as f64 * bin_hz
    ));

    changed
}

pub fn draw_readouts(ui: &mut egui::Ui, report: Option<&FrameReport>, frames: u64, dropped: usize) {
    egui::Grid::new("readouts").num_columns(2).show(ui, |ui| {
        let Some(report) = report else {
            ui.label("No frames yet");
            ui.end_row();
            return;
        };

        ui.label("Level");
        ui.label(format!("{:.3}", report.level));
        ui.end_row();

        ui.label("Duty");
        ui.label(format!("{}", report.duty));
        ui.end_row();

        ui.label("AGC gain");
        ui.label(format!("{:.3}", report.gain));
        ui.end_row();

        ui.label("EMA energy");
        ui.label(format!("{:.3}", report.ema_energy));
        ui.end_row();

        ui.label("Sample rate");
        ui.label(format!("{:.0} Hz", report.timing.effective_rate_hz()));
        ui.end_row();

        ui.label("Frames");
        ui.label(format!("{frames}"));
        ui.end_row();

        ui.label("Dropped");
        ui.label(format!("{dropped}"));
        ui.end_row();
    });
}
