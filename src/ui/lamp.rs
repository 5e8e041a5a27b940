use eframe::egui;

use super::spectrum::lerp_rgba;

/// The lamp as a disc lit by the PWM duty.
pub fn draw_lamp(ui: &mut egui::Ui, duty: u8, pwm_hz: Option<f64>) {
    ui.group(|ui| {
        ui.set_min_size(egui::vec2(160.0, 180.0));
        ui.vertical_centered(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(140.0, 140.0), egui::Sense::hover());
            let center = response.rect.center();
            let brightness = f32::from(duty) / 255.0;

            let off = egui::Rgba::from(egui::Color32::from_rgb(35, 30, 25));
            let on = egui::Rgba::from(egui::Color32::from_rgb(255, 214, 140));
            let color = egui::Color32::from(lerp_rgba(off, on, brightness));

            // halo
            for ring in (1..=4).rev() {
                let alpha = (brightness * 40.0 / ring as f32) as u8;
                painter.circle_filled(
                    center,
                    45.0 + ring as f32 * 5.0,
                    egui::Color32::from_rgba_unmultiplied(255, 200, 120, alpha),
                );
            }
            painter.circle(center, 45.0, color, egui::Stroke::new(1.0, egui::Color32::GRAY));

            ui.label(format!("duty {duty}/255"));
            if let Some(hz) = pwm_hz {
                ui.label(format!("PWM {:.2} kHz", hz / 1000.0));
            }
        });
    });
}
