use cpal::Host;
use eframe::{App, CreationContext, egui};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use crate::audio::devices::{get_input_device, init_devices};
use crate::audio::{LampState, LineCapture};
use crate::board::{HostBoard, Knobs, PwmOutput, Timer1};
use crate::config::{FFT_SIZE, SAMPLE_RATE_HZ};
use crate::controller::LineLight;
use crate::dsp::Spectrum;
use crate::error::{LineLightError, Result};
use crate::ui::{draw_lamp, draw_pot_sliders, draw_readouts, draw_spectrum};

pub struct LineLightApp {
    state: Arc<Mutex<LampState>>,
    knobs: Arc<Knobs>,
    timer: Timer1,
    host: Host,
    capture: Option<LineCapture>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    pots: [u16; 2],
}

fn lock(state: &Mutex<LampState>) -> MutexGuard<'_, LampState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LineLightApp {
    pub fn new(_cc: &CreationContext, pot1: u16, pot2: u16) -> Self {
        let host = cpal::default_host();
        let timer = Timer1::new();
        timer.configure_phase_correct_8bit();

        let mut app = Self {
            state: Arc::new(Mutex::new(LampState::default())),
            knobs: Arc::new(Knobs::new(pot1, pot2)),
            timer,
            host,
            capture: None,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
            pots: [pot1, pot2],
        };

        app.init_devices();

        app
    }

    fn init_devices(&mut self) {
        let (devices, input_device_index) = init_devices(&self.host);
        log::info!("{} input device(s) found", devices.len());

        let mut state = lock(&self.state);
        state.devices = devices;
        state.input_device_index = input_device_index;
    }

    pub fn start_processing(&mut self) -> Result<()> {
        if lock(&self.state).running {
            return Ok(());
        }

        let device = {
            let state = lock(&self.state);
            get_input_device(&self.host, &state.devices, state.input_device_index)
        }
        .ok_or(LineLightError::NoInputDevice)?;

        let (capture, consumer) = LineCapture::start(&device)?;
        let board = HostBoard::new(consumer, capture.sample_rate(), Arc::clone(&self.knobs));

        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);
        let state_weak = Arc::downgrade(&self.state);
        let pwm = self.timer.clone();
        self.worker = Some(thread::spawn(move || run_controller(board, pwm, state_weak, stop)));

        {
            let mut state = lock(&self.state);
            state.capture_rate = capture.sample_rate();
            state.running = true;
        }
        self.capture = Some(capture);

        Ok(())
    }

    pub fn stop_processing(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let Some(worker) = self.worker.take() else {
            return;
        };
        if worker.join().is_err() {
            log::error!("Controller thread panicked");
        }
        self.capture = None;

        let mut state = lock(&self.state);
        state.running = false;
        state.clear_frame();
        log::info!("Stopped");
    }
}

/// The main loop of the lamp, on its own thread until asked to stop.
fn run_controller(
    mut board: HostBoard,
    mut pwm: Timer1,
    state: Weak<Mutex<LampState>>,
    stop: Arc<AtomicBool>,
) {
    let mut controller = LineLight::new();
    controller.boot(&mut board, &mut pwm);

    while !stop.load(Ordering::Relaxed) {
        let report = controller.run_frame(&mut board, &mut pwm);

        let Some(state) = state.upgrade() else {
            break;
        };
        // never hold up the loop for the GUI
        if let Ok(mut state) = state.try_lock() {
            state.publish(report, controller.magnitudes());
        }
    }

    pwm.write_duty(0);
}

impl Drop for LineLightApp {
    fn drop(&mut self) {
        self.stop_processing();
    }
}

impl App for LineLightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let running = lock(&self.state).running;

        if running {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                if ui
                    .button(if running { "Stop" } else { "Start" })
                    .clicked()
                {
                    if running {
                        self.stop_processing();
                    } else if let Err(e) = self.start_processing() {
                        log::error!("Failed to start: {e}");
                    }
                }

                ui.label(if running {
                    "Status: Running"
                } else {
                    "Status: Stopped"
                });
            });
        });

        egui::SidePanel::right("devices_panel").show(ctx, |ui| {
            ui.heading("Line Input");

            let (devices, input_idx) = {
                let state = lock(&self.state);
                (state.devices.clone(), state.input_device_index)
            };

            let mut new_input_idx = input_idx;
            egui::ComboBox::from_label("Input Device")
                .selected_text(devices.get(input_idx).map(String::as_str).unwrap_or("None"))
                .show_ui(ui, |ui| {
                    for (i, device_name) in devices.iter().enumerate() {
                        ui.selectable_value(&mut new_input_idx, i, device_name);
                    }
                });

            if new_input_idx != input_idx {
                lock(&self.state).input_device_index = new_input_idx;
            }

            if ui.button("Apply Device Settings").clicked() && running {
                self.stop_processing();
                if let Err(e) = self.start_processing() {
                    log::error!("Failed to restart: {e}");
                }
            }

            ui.separator();
            ui.label(format!("Fs = {SAMPLE_RATE_HZ} Hz, N = {FFT_SIZE}"));
            let capture_rate = lock(&self.state).capture_rate;
            if capture_rate > 0 {
                ui.label(format!("Capture @ {capture_rate} Hz"));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (report, spectrum, frames) = {
                let state = lock(&self.state);
                (state.last_frame, state.spectrum.clone(), state.frames)
            };
            let dropped = self.capture.as_ref().map_or(0, LineCapture::dropped);
            let bin_hz = Spectrum::<FFT_SIZE>::bin_to_hz(1);

            ui.horizontal(|ui| {
                draw_lamp(ui, self.timer.duty(), self.timer.output_frequency_hz());

                ui.vertical(|ui| {
                    if draw_pot_sliders(ui, &mut self.pots, LineLight::nyquist_bin(), bin_hz) {
                        self.knobs.set(self.pots[0], self.pots[1]);
                    }
                });

                ui.vertical(|ui| {
                    draw_readouts(ui, report.as_ref(), frames, dropped);
                });
            });

            ui.add_space(8.0);
            draw_spectrum(ui, &spectrum, report.map(|r| r.band), bin_hz);
        });
    }
}
