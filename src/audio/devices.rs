use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host, SampleFormat, StreamConfig};

use crate::error::{LineLightError, Result};

pub fn get_input_device(host: &Host, devices: &[String], index: usize) -> Option<Device> {
    let device_name = devices.get(index)?;

    host.input_devices()
        .ok()?
        .find(|device| device.name().is_ok_and(|name| &name == device_name))
}

/// Input device names, plus the index of the system default among them.
pub fn init_devices(host: &Host) -> (Vec<String>, usize) {
    let mut devices = Vec::new();

    if let Ok(input_devices) = host.input_devices() {
        for device in input_devices {
            if let Ok(name) = device.name() {
                devices.push(name);
            }
        }
    }

    let default_index = host
        .default_input_device()
        .and_then(|device| device.name().ok())
        .and_then(|name| devices.iter().position(|d| *d == name))
        .unwrap_or(0);

    (devices, default_index)
}

/// The device's own default config, as long as it delivers f32 samples.
pub fn input_stream_config(device: &Device) -> Result<StreamConfig> {
    let config = device.default_input_config()?;

    if config.sample_format() != SampleFormat::F32 {
        return Err(LineLightError::UnsupportedSampleFormat {
            found: format!("{:?}", config.sample_format()),
        });
    }

    Ok(config.into())
}
