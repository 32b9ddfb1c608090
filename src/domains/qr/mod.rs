pub mod qr_generator;

pub use qr_generator::{QrConfig, QrGenerator};
