pub mod fiscal_device;
pub mod qr;
