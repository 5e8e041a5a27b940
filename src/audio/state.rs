use crate::config::FFT_SIZE;
use crate::controller::FrameReport;

/// What the GUI shows, refreshed by the controller thread after each frame.
pub struct LampState {
    pub running: bool,
    pub input_device_index: usize,
    pub devices: Vec<String>,
    pub capture_rate: u32,
    pub frames: u64,
    pub last_frame: Option<FrameReport>,
    /// Magnitudes for bins `0..N/2` of the last frame.
    pub spectrum: Vec<f64>,
}

impl LampState {
    pub fn publish(&mut self, report: FrameReport, magnitudes: &[f64]) {
        self.frames += 1;
        self.last_frame = Some(report);
        self.spectrum.clear();
        self.spectrum
            .extend_from_slice(&magnitudes[..magnitudes.len() / 2]);
    }

    pub fn clear_frame(&mut self) {
        self.frames = 0;
        self.last_frame = None;
        self.spectrum.iter_mut().for_each(|m| *m = 0.0);
    }
}

impl Default for LampState {
    fn default() -> Self {
        Self {
            running: false,
            input_device_index: 0,
            devices: Vec::new(),
            capture_rate: 0,
            frames: 0,
            last_frame: None,
            spectrum: vec![0.0; FFT_SIZE / 2],
        }
    }
}
