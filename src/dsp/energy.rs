use super::band::BandSelection;

/// Mean squared magnitude over the band. Dividing by the bin count keeps the
/// level comparable when the band is widened or narrowed.
pub fn band_energy(magnitudes: &[f64], band: BandSelection) -> f64 {
    let sum: f64 = magnitudes[band.bins()].iter().map(|m| m * m).sum();
    sum / band.bin_count() as f64
}
