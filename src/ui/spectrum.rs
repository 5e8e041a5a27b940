use eframe::egui;

use crate::dsp::BandSelection;

/// Top of the plot. A full-scale tone at N = 256 lands around 90 dB.
const DB_RANGE: f32 = 100.0;

pub fn lerp_rgba(from: egui::Rgba, to: egui::Rgba, t: f32) -> egui::Rgba {
    egui::Rgba::from_rgba_premultiplied(
        from.r() + (to.r() - from.r()) * t,
        from.g() + (to.g() - from.g()) * t,
        from.b() + (to.b() - from.b()) * t,
        from.a() + (to.a() - from.a()) * t,
    )
}

fn magnitude_db(magnitude: f64) -> f32 {
    (20.0 * (magnitude + 1e-9).log10()).clamp(0.0, f64::from(DB_RANGE)) as f32
}

/// Bars for bins `1..magnitudes.len()`, the selected band drawn brighter.
pub fn draw_spectrum(
    ui: &mut egui::Ui,
    magnitudes: &[f64],
    band: Option<BandSelection>,
    bin_hz: f64,
) {
    ui.group(|ui| {
        ui.set_height(180.0);
        ui.heading("Spectrum");

        let left_margin = 45.0;
        let bottom_margin = 15.0;

        let available_width = ui.available_width();
        let available_height = ui.available_height();

        let response = ui.allocate_rect(
            egui::Rect::from_min_size(
                ui.min_rect().min,
                egui::vec2(available_width, available_height),
            ),
            egui::Sense::hover(),
        );

        let painter = ui.painter();
        let rect = response.rect;

        let graph_rect = egui::Rect::from_min_max(
            egui::pos2(rect.left() + left_margin, rect.top()),
            egui::pos2(rect.right(), rect.bottom() - bottom_margin),
        );

        painter.rect_filled(rect, 5.0, egui::Color32::from_rgb(20, 20, 30));

        let grid_color = egui::Color32::from_rgba_premultiplied(100, 100, 100, 100);
        let label_color = egui::Color32::from_rgb(180, 180, 180);

        for i in 0..=5 {
            let y = graph_rect.top() + (i as f32 * graph_rect.height() / 5.0);
            painter.line_segment(
                [egui::pos2(graph_rect.left(), y), egui::pos2(graph_rect.right(), y)],
                egui::Stroke::new(1.0, grid_color),
            );
            painter.text(
                egui::pos2(rect.left() + 5.0, y),
                egui::Align2::LEFT_CENTER,
                format!("{:.0} dB", DB_RANGE - i as f32 * DB_RANGE / 5.0),
                egui::FontId::proportional(9.0),
                label_color,
            );
        }

        if magnitudes.len() < 2 {
            return;
        }

        let bins = magnitudes.len() - 1;
        let bar_width = graph_rect.width() / bins as f32;

        // frequency ticks every quarter of the range
        for q in 0..=4 {
            let bin = 1 + (bins - 1) * q / 4;
            let x = graph_rect.left() + (bin - 1) as f32 * bar_width + bar_width / 2.0;
            painter.text(
                egui::pos2(x, rect.bottom() - 5.0),
                egui::Align2::CENTER_CENTER,
                format!("{:.0} Hz", bin as f64 * bin_hz),
                egui::FontId::proportional(9.0),
                label_color,
            );
        }

        let base_color = egui::Color32::from_rgb(30, 70, 140);
        let bright_color = egui::Color32::from_rgb(50, 120, 250);
        let band_base = egui::Color32::from_rgb(140, 90, 20);
        let band_bright = egui::Color32::from_rgb(255, 190, 60);

        for (i, &magnitude) in magnitudes.iter().enumerate().skip(1) {
            let x_left = graph_rect.left() + (i - 1) as f32 * bar_width;
            let normalized = magnitude_db(magnitude) / DB_RANGE;
            let bar_height = normalized * graph_rect.height();

            let in_band = band.is_some_and(|b| b.contains(i));
            let (from, to) = if in_band {
                (band_base, band_bright)
            } else {
                (base_color, bright_color)
            };

            if in_band {
                painter.rect_filled(
                    egui::Rect::from_min_max(
                        egui::pos2(x_left, graph_rect.top()),
                        egui::pos2(x_left + bar_width, graph_rect.bottom()),
                    ),
                    0.0,
                    egui::Color32::from_rgba_premultiplied(60, 40, 10, 40),
                );
            }

            if bar_height > 0.0 {
                let color = lerp_rgba(egui::Rgba::from(from), egui::Rgba::from(to), normalized);
                painter.rect_filled(
                    egui::Rect::from_min_max(
                        egui::pos2(x_left + 0.5, graph_rect.bottom() - bar_height),
                        egui::pos2(x_left + bar_width - 0.5, graph_rect.bottom()),
                    ),
                    0.0,
                    egui::Color32::from(color),
                );
            }
        }
    });
}
