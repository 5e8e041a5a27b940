pub const SAMPLE_RATE_HZ: u32 = 9600;
pub const SAMPLE_PERIOD_US: u32 = (1_000_000 + SAMPLE_RATE_HZ / 2) / SAMPLE_RATE_HZ;

pub const FFT_SIZE: usize = 256;

pub const ADC_BIAS: u16 = 512;
pub const ADC_MAX: u16 = 1023;

pub const EMA_ALPHA: f64 = 0.20;
pub const TARGET_LEVEL: f64 = 0.35;
pub const AGC_STEP: f64 = 0.015;
pub const AGC_MIN: f64 = 0.05;
pub const AGC_MAX: f64 = 200.0;
pub const PWM_GAMMA: f64 = 2.0;

pub const F_CPU_HZ: u32 = 16_000_000;
pub const SERIAL_BAUD: u32 = 115_200;
pub const TRACE_INTERVAL_MS: u32 = 1000;
pub const BOOT_BANNER: &str = "LineLight-1 boot";

// ~0.2 s of 48 kHz capture between the cpal callback and the sampler
pub const CAPTURE_RING_CAPACITY: usize = 8192;
