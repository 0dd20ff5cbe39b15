//! Domain models for invoicing-service.

mod form;
mod invoice;
mod user;

pub use form::{FieldErrors, FormData, FormState};
pub use invoice::{Invoice, InvoiceChanges, InvoiceId, InvoiceStatus, NewInvoice};
pub use user::{NewUser, User};
