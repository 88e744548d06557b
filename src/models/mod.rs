pub mod audit_event;
pub mod stripe_event;

pub use audit_event::{AuditEvent, AuditRecord};
pub use stripe_event::StripeEvent;
