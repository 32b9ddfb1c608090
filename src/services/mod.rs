// ============================================================================
// FISCAL DEVICE ACCESS
// ============================================================================
pub mod fiscal_device;

pub use fiscal_device::{FiscalDevice, LocalFiscalDevice, RemoteFiscalDevice};
