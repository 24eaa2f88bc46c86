//! Blocks shared by every layout. Each returns a markup fragment; templates
//! decide arrangement and accent.

use billfold_invoices::{Amount, AmountType, Details, Item, Party};

use crate::format::{escape, format_currency, format_date};

pub(crate) fn currency_code(details: Option<&Details>) -> String {
    details
        .and_then(|d| d.currency.clone())
        .unwrap_or_else(|| "USD".to_string())
}

fn line(label: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("<p><span class=\"muted\">{label}</span> {}</p>\n", escape(value))
    }
}

/// Sender postal block (address lines, no name — headers render the name).
pub(crate) fn sender_address(sender: Option<&Party>) -> String {
    let Some(sender) = sender else {
        return String::new();
    };
    let mut out = String::from("<address class=\"muted\" style=\"font-style: normal\">\n");
    for part in [&sender.address, &sender.zip_code, &sender.city, &sender.country]
        .into_iter()
        .flatten()
    {
        out.push_str(&format!("{}<br>\n", escape(part)));
    }
    out.push_str("</address>\n");
    out
}

/// "Bill To" block.
pub(crate) fn bill_to(receiver: Option<&Party>) -> String {
    let mut out = String::from("<h3>Bill To:</h3>\n<div class=\"muted\">\n");
    if let Some(receiver) = receiver {
        if let Some(name) = &receiver.name {
            out.push_str(&format!("<p><strong>{}</strong></p>\n", escape(name)));
        }
        for part in [&receiver.address, &receiver.city, &receiver.zip_code, &receiver.country]
            .into_iter()
            .flatten()
        {
            out.push_str(&format!("<p>{}</p>\n", escape(part)));
        }
        if let Some(email) = &receiver.email {
            out.push_str(&format!("<p>Email: {}</p>\n", escape(email)));
        }
        if let Some(phone) = &receiver.phone {
            out.push_str(&format!("<p>Phone: {}</p>\n", escape(phone)));
        }
    }
    out.push_str("</div>\n");
    out
}

/// Invoice date / due date / PO number block.
pub(crate) fn meta(details: Option<&Details>) -> String {
    let mut out = String::from("<h3>Invoice Details:</h3>\n<div class=\"muted\">\n");
    if let Some(details) = details {
        out.push_str(&line("Invoice Date:", &format_date(details.invoice_date)));
        out.push_str(&line("Due Date:", &format_date(details.due_date)));
        if let Some(po) = &details.purchase_order_number {
            out.push_str(&line("PO Number:", po));
        }
    }
    out.push_str("</div>\n");
    out
}

fn item_row(item: &Item, currency: &str) -> String {
    let name = item.name.as_deref().unwrap_or("");
    let description = item.description.as_deref().unwrap_or("");
    let quantity = item.quantity.unwrap_or(0.0);
    let rate = item.unit_price.or(item.price).unwrap_or(0.0);
    let total = item.total.unwrap_or(quantity * rate);

    format!(
        "<tr>\n<td><strong>{}</strong><br><span class=\"muted\">{}</span></td>\n\
         <td class=\"num\">{quantity}</td>\n\
         <td class=\"num\">{}</td>\n\
         <td class=\"num\">{}</td>\n</tr>\n",
        escape(name),
        escape(description),
        format_currency(rate, currency),
        format_currency(total, currency),
    )
}

/// The line-item table.
pub(crate) fn items_table(details: Option<&Details>) -> String {
    let currency = currency_code(details);
    let mut out = String::from(
        "<table class=\"items\">\n<thead>\n<tr><th>Item</th><th class=\"num\">Qty</th>\
         <th class=\"num\">Rate</th><th class=\"num\">Amount</th></tr>\n</thead>\n<tbody>\n",
    );
    if let Some(items) = details.and_then(|d| d.items.as_ref()) {
        for item in items {
            out.push_str(&item_row(item, &currency));
        }
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn amount_label(amount: Amount, currency: &str) -> String {
    match amount.amount_type {
        AmountType::Percentage => format!("{}%", amount.amount),
        AmountType::Fixed => format_currency(amount.amount, currency),
    }
}

/// Subtotal / discount / tax / shipping / total block.
pub(crate) fn totals(details: Option<&Details>) -> String {
    let currency = currency_code(details);
    let mut out = String::from("<div class=\"totals\">\n");

    let sub_total = details.and_then(|d| d.sub_total).unwrap_or(0.0);
    out.push_str(&format!(
        "<div><span>Subtotal:</span><span>{}</span></div>\n",
        format_currency(sub_total, &currency)
    ));

    if let Some(discount) = details.and_then(|d| d.discount).filter(|a| a.amount > 0.0) {
        out.push_str(&format!(
            "<div><span>Discount:</span><span>- {}</span></div>\n",
            amount_label(discount, &currency)
        ));
    }
    if let Some(tax) = details.and_then(|d| d.tax).filter(|a| a.amount > 0.0) {
        out.push_str(&format!(
            "<div><span>Tax:</span><span>+ {}</span></div>\n",
            amount_label(tax, &currency)
        ));
    }
    if let Some(cost) = details
        .and_then(|d| d.shipping.as_ref())
        .and_then(|s| s.cost)
        .filter(|c| *c > 0.0)
    {
        out.push_str(&format!(
            "<div><span>Shipping:</span><span>+ {}</span></div>\n",
            format_currency(cost, &currency)
        ));
    }

    let total = details.and_then(|d| d.total_amount).unwrap_or(sub_total);
    out.push_str(&format!(
        "<div class=\"grand\"><span>Total:</span><span>{}</span></div>\n",
        format_currency(total, &currency)
    ));
    out.push_str("</div>\n");
    out
}

/// Bank coordinates block; empty when the document carries none.
pub(crate) fn payment_information(details: Option<&Details>) -> String {
    let Some(info) = details.and_then(|d| d.payment_information.as_ref()) else {
        return String::new();
    };

    let rows = [
        ("Bank:", &info.bank_name),
        ("Account name:", &info.account_name),
        ("Account number:", &info.account_number),
        ("Routing number:", &info.routing_number),
        ("IBAN:", &info.iban),
        ("SWIFT:", &info.swift),
    ];

    let mut body = String::new();
    for (label, value) in rows {
        if let Some(value) = value {
            body.push_str(&line(label, value));
        }
    }
    if body.is_empty() {
        return String::new();
    }

    format!("<div class=\"section\">\n<h3>Payment Information</h3>\n<div class=\"muted\">\n{body}</div>\n</div>\n")
}

/// Additional notes and payment terms.
pub(crate) fn notes(details: Option<&Details>) -> String {
    let mut out = String::new();
    if let Some(notes) = details.and_then(|d| d.additional_notes.as_deref()) {
        if !notes.is_empty() {
            out.push_str(&format!(
                "<div class=\"section\">\n<h3>Additional Notes</h3>\n<p class=\"muted\">{}</p>\n</div>\n",
                escape(notes)
            ));
        }
    }
    if let Some(terms) = details.and_then(|d| d.payment_terms.as_deref()) {
        if !terms.is_empty() {
            out.push_str(&format!(
                "<div class=\"section\">\n<h3>Payment Terms</h3>\n<p class=\"muted\">{}</p>\n</div>\n",
                escape(terms)
            ));
        }
    }
    out
}

/// Drawn/uploaded signatures render as an image, typed ones in their font.
pub(crate) fn signature(details: Option<&Details>) -> String {
    let Some(sig) = details.and_then(|d| d.signature.as_ref()) else {
        return String::new();
    };
    let Some(data) = sig.data.as_deref().filter(|d| !d.is_empty()) else {
        return String::new();
    };

    let rendered = if data.starts_with("data:image") {
        format!("<img src=\"{}\" alt=\"Signature\">", escape(data))
    } else {
        let font = sig.font_family.as_deref().unwrap_or("cursive");
        format!(
            "<p style=\"font-family: {}, cursive; font-size: 28px; margin: 0\">{}</p>",
            escape(font),
            escape(data)
        )
    };

    format!("<div class=\"section signature\">\n<h3>Signature</h3>\n{rendered}\n</div>\n")
}

/// Company logo, when configured.
pub(crate) fn logo(details: Option<&Details>) -> String {
    match details.and_then(|d| d.invoice_logo.as_deref()).filter(|l| !l.is_empty()) {
        Some(src) => format!("<img class=\"logo\" src=\"{}\" alt=\"Logo\">\n", escape(src)),
        None => String::new(),
    }
}
