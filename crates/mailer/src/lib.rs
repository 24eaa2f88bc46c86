//! `billfold-mailer` — outbound email boundary.
//!
//! The application talks to a [`Mailer`]; deployments configure either the
//! HTTP mail-gateway implementation or the no-op one (which logs the
//! envelope and succeeds, the dev behavior the product started with).

pub mod invoice_email;
pub mod magic_link;
pub mod message;
pub mod send;

pub use invoice_email::{default_invoice_subject, invoice_email};
pub use magic_link::magic_link_email;
pub use message::{Attachment, OutboundEmail};
pub use send::{HttpMailer, MailError, Mailer, NoopMailer};
