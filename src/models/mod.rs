pub mod invoice;

pub use invoice::{FiscalRecord, Invoice, LineItem, NewInvoice, NewLineItem};
