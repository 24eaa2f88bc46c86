//! Invoice delivery email.

use crate::message::{Attachment, OutboundEmail};

/// Default subject when the sender did not provide one.
pub fn default_invoice_subject(invoice_number: Option<&str>) -> String {
    match invoice_number {
        Some(number) if !number.is_empty() => format!("Invoice {number}"),
        _ => "Your invoice".to_string(),
    }
}

/// Build the delivery email with the rendered invoice attached.
pub fn invoice_email(
    to: &str,
    subject: Option<&str>,
    message: Option<&str>,
    attachment: Attachment,
) -> OutboundEmail {
    let subject = match subject.filter(|s| !s.trim().is_empty()) {
        Some(s) => s.to_string(),
        None => default_invoice_subject(None),
    };
    let text = match message.filter(|m| !m.trim().is_empty()) {
        Some(m) => m.to_string(),
        None => "Please find your invoice attached.\n\nThanks,\nThe Billfold Team".to_string(),
    };

    OutboundEmail::new(to, subject, text).with_attachment(attachment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> Attachment {
        Attachment {
            filename: "invoice-INV-1.html".to_string(),
            content_type: "text/html".to_string(),
            content: b"<html></html>".to_vec(),
        }
    }

    #[test]
    fn defaults_fill_missing_subject_and_message() {
        let email = invoice_email("a@b.co", None, None, attachment());
        assert_eq!(email.subject, "Your invoice");
        assert!(email.text.contains("attached"));
        assert_eq!(email.attachments.len(), 1);
    }

    #[test]
    fn explicit_subject_and_message_win() {
        let email = invoice_email("a@b.co", Some("March invoice"), Some("Hi!"), attachment());
        assert_eq!(email.subject, "March invoice");
        assert_eq!(email.text, "Hi!");
    }

    #[test]
    fn numbered_subject_helper() {
        assert_eq!(default_invoice_subject(Some("INV-9")), "Invoice INV-9");
        assert_eq!(default_invoice_subject(Some("")), "Your invoice");
        assert_eq!(default_invoice_subject(None), "Your invoice");
    }
}
