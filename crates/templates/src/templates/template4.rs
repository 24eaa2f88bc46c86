//! Template 4 — bold banner header, purple accent.

use billfold_invoices::Invoice;

use crate::format::escape;
use crate::layout::page;
use crate::partials;

pub(crate) fn render(invoice: &Invoice) -> String {
    let details = invoice.details.as_ref();
    let sender_name = invoice
        .sender
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .unwrap_or("");
    let number = invoice.invoice_number().unwrap_or("");

    let mut body = String::new();

    body.push_str("<div class=\"accent-bg row\" style=\"padding: 24px; margin: -40px -40px 0\">\n");
    body.push_str(&format!("<h1>{}</h1>\n", escape(sender_name)));
    body.push_str(&format!(
        "<div style=\"text-align: right\">\n<h2>INVOICE</h2>\n<p>{}</p>\n</div>\n",
        escape(number)
    ));
    body.push_str("</div>\n");

    body.push_str("<div class=\"row section\">\n<div>\n");
    body.push_str(&partials::logo(details));
    body.push_str(&partials::sender_address(invoice.sender.as_ref()));
    body.push_str("</div>\n<div>\n");
    body.push_str(&partials::bill_to(invoice.receiver.as_ref()));
    body.push_str("</div>\n<div style=\"text-align: right\">\n");
    body.push_str(&partials::meta(details));
    body.push_str("</div>\n</div>\n");

    body.push_str("<div class=\"section\">\n");
    body.push_str(&partials::items_table(details));
    body.push_str(&partials::totals(details));
    body.push_str("</div>\n");

    body.push_str(&partials::payment_information(details));
    body.push_str(&partials::notes(details));
    body.push_str(&partials::signature(details));

    page(&escape(&format!("Invoice {number}")), "#7c3aed", &body)
}
