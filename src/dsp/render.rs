use crate::config::PWM_GAMMA;

/// Gamma-map a level to an 8-bit duty, rounding half up.
pub fn duty_from_level(level: f64) -> u8 {
    let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    (level.powf(PWM_GAMMA) * 255.0 + 0.5).floor().min(255.0) as u8
}
