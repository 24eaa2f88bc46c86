//! Document normalization and totals.
//!
//! [`process_invoice`] is the single entry point the write paths go through:
//! whatever coercible shape came in, what comes out has items in one place,
//! canonical tax/discount/shipping objects (legacy aliases mirrored), and
//! recomputed totals.

use crate::model::{Amount, AmountType, Invoice, Item, Shipping};

/// Computed invoice-level figures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub sub_total: f64,
    pub total_tax: f64,
    pub total_discount: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
}

fn item_unit_price(item: &Item) -> f64 {
    item.unit_price.or(item.price).unwrap_or(0.0)
}

/// Canonicalize a single line item and compute its total.
///
/// Percentage discounts apply to the item subtotal; percentage tax applies
/// to the discounted subtotal. Zero amounts fall back to the legacy
/// `tax_rate`/`discount_rate` fields.
pub fn process_item(item: &Item) -> Item {
    let quantity = item.quantity.unwrap_or(0.0);
    let unit_price = item_unit_price(item);

    let tax_amount = item
        .tax
        .map(|t| t.amount)
        .filter(|a| *a != 0.0)
        .or(item.tax_rate.filter(|a| *a != 0.0))
        .unwrap_or(0.0);
    let tax_type = item.tax.map(|t| t.amount_type).unwrap_or(AmountType::Percentage);

    let discount_amount = item
        .discount
        .map(|d| d.amount)
        .filter(|a| *a != 0.0)
        .or(item.discount_rate.filter(|a| *a != 0.0))
        .unwrap_or(0.0);
    let discount_type = item
        .discount
        .map(|d| d.amount_type)
        .unwrap_or(AmountType::Percentage);

    let subtotal = quantity * unit_price;

    let discount_value = if discount_amount > 0.0 {
        Amount { amount: discount_amount, amount_type: discount_type }.applied_to(subtotal)
    } else {
        0.0
    };

    let taxable = subtotal - discount_value;
    let tax_value = if tax_amount > 0.0 {
        Amount { amount: tax_amount, amount_type: tax_type }.applied_to(taxable)
    } else {
        0.0
    };

    let mut out = item.clone();
    out.quantity = Some(quantity);
    out.unit_price = Some(unit_price);
    // Keep the legacy alias in sync.
    out.price = Some(unit_price);
    out.tax = Some(Amount { amount: tax_amount, amount_type: tax_type });
    out.discount = Some(Amount { amount: discount_amount, amount_type: discount_type });
    out.total = Some(taxable + tax_value);
    out
}

/// Invoice-level aggregation over already-processed items.
///
/// Item percentages accumulate against each item's subtotal. The
/// invoice-level tax percentage applies to `sub_total - item discounts`
/// (computed before the invoice-level discount lands), the invoice-level
/// discount percentage to `sub_total`, and shipping contributes its flat
/// cost.
pub fn compute_totals(items: &[Item], tax: Amount, discount: Amount, shipping: &Shipping) -> Totals {
    let mut sub_total = 0.0;
    let mut total_tax = 0.0;
    let mut total_discount = 0.0;

    for item in items {
        let item_subtotal = item.quantity.unwrap_or(0.0) * item_unit_price(item);
        sub_total += item_subtotal;

        if let Some(t) = item.tax {
            total_tax += t.applied_to(item_subtotal);
        }
        if let Some(d) = item.discount {
            total_discount += d.applied_to(item_subtotal);
        }
    }

    total_tax += tax.applied_to(sub_total - total_discount);
    total_discount += discount.applied_to(sub_total);

    let shipping_cost = shipping.cost.unwrap_or(0.0);
    let total_amount = sub_total - total_discount + total_tax + shipping_cost;

    Totals { sub_total, total_tax, total_discount, shipping_cost, total_amount }
}

/// Normalize a parsed document: merge legacy locations, canonicalize items,
/// recompute totals, mirror legacy aliases.
pub fn process_invoice(mut invoice: Invoice) -> Invoice {
    let mut details = invoice.details.take().unwrap_or_default();

    // Legacy settings block: fills gaps, never overrides explicit details.
    if let Some(settings) = invoice.settings.as_ref() {
        details.pdf_template = details.pdf_template.or(settings.template);
        details.invoice_logo = details.invoice_logo.take().or_else(|| settings.logo.clone());
    }

    // Items may live on details or (legacy) at the document root.
    let source_items = details
        .items
        .take()
        .or_else(|| invoice.items.take())
        .unwrap_or_default();
    let items: Vec<Item> = source_items.iter().map(process_item).collect();

    let tax = details.tax.or(details.tax_details).unwrap_or_default();
    let discount = details.discount.or(details.discount_details).unwrap_or_default();
    let shipping = details
        .shipping
        .take()
        .or_else(|| details.shipping_details.take())
        .unwrap_or_default();

    let totals = compute_totals(&items, tax, discount, &shipping);

    details.additional_notes = details.additional_notes.take().or_else(|| details.notes.clone());
    details.payment_terms = details.payment_terms.take().or_else(|| details.terms.clone());

    details.items = Some(items);
    details.sub_total = Some(totals.sub_total);
    details.total_amount = Some(totals.total_amount);
    details.tax = Some(tax);
    details.discount = Some(discount);
    details.shipping = Some(shipping.clone());
    details.tax_details = Some(tax);
    details.discount_details = Some(discount);
    details.shipping_details = Some(shipping);

    invoice.details = Some(details);
    invoice.items = None;

    // Storage identity is managed by the store layer; never let stale copies
    // of it ride along inside the document body.
    for key in ["_id", "id", "userId", "createdAt", "updatedAt"] {
        invoice.extra.remove(key);
    }

    invoice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Details, Settings};
    use serde_json::json;

    fn item(quantity: f64, unit_price: f64) -> Item {
        Item {
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Item::default()
        }
    }

    #[test]
    fn item_total_applies_discount_before_tax() {
        let mut it = item(2.0, 100.0);
        it.discount = Some(Amount::fixed(20.0));
        it.tax = Some(Amount::percentage(10.0));

        let processed = process_item(&it);
        // 200 - 20 = 180, + 10% tax = 198
        assert_eq!(processed.total, Some(198.0));
        assert_eq!(processed.price, Some(100.0));
    }

    #[test]
    fn zero_tax_falls_back_to_legacy_rate() {
        let mut it = item(1.0, 100.0);
        it.tax = Some(Amount::percentage(0.0));
        it.tax_rate = Some(19.0);

        let processed = process_item(&it);
        assert_eq!(processed.tax, Some(Amount::percentage(19.0)));
        assert_eq!(processed.total, Some(119.0));
    }

    #[test]
    fn unit_price_falls_back_to_legacy_price() {
        let mut it = Item::default();
        it.quantity = Some(4.0);
        it.price = Some(12.5);

        let processed = process_item(&it);
        assert_eq!(processed.unit_price, Some(12.5));
        assert_eq!(processed.total, Some(50.0));
    }

    #[test]
    fn invoice_totals_match_the_documented_ordering() {
        let mut a = item(2.0, 100.0);
        a.tax = Some(Amount::percentage(10.0));
        let mut b = item(1.0, 50.0);
        b.discount = Some(Amount::fixed(5.0));

        let items: Vec<Item> = [a, b].iter().map(process_item).collect();
        let totals = compute_totals(
            &items,
            Amount::percentage(10.0),
            Amount::percentage(10.0),
            &Shipping { cost: Some(7.0), ..Shipping::default() },
        );

        assert_eq!(totals.sub_total, 250.0);
        // item tax 20 + global 10% of (250 - 5)
        assert_eq!(totals.total_tax, 44.5);
        // item discount 5 + global 10% of 250
        assert_eq!(totals.total_discount, 30.0);
        assert_eq!(totals.shipping_cost, 7.0);
        assert_eq!(totals.total_amount, 250.0 - 30.0 + 44.5 + 7.0);
    }

    #[test]
    fn root_items_move_into_details() {
        let invoice = Invoice {
            items: Some(vec![item(1.0, 10.0)]),
            ..Invoice::default()
        };

        let processed = process_invoice(invoice);
        assert!(processed.items.is_none());
        let details = processed.details.unwrap();
        assert_eq!(details.items.as_ref().unwrap().len(), 1);
        assert_eq!(details.sub_total, Some(10.0));
        assert_eq!(details.total_amount, Some(10.0));
    }

    #[test]
    fn settings_fill_details_without_overriding() {
        let invoice = Invoice {
            details: Some(Details {
                invoice_logo: Some("logo-a.png".into()),
                ..Details::default()
            }),
            settings: Some(Settings {
                logo: Some("logo-b.png".into()),
                template: Some(3),
                ..Settings::default()
            }),
            ..Invoice::default()
        };

        let details = process_invoice(invoice).details.unwrap();
        assert_eq!(details.invoice_logo.as_deref(), Some("logo-a.png"));
        assert_eq!(details.pdf_template, Some(3));
    }

    #[test]
    fn legacy_aliases_resolve_and_mirror() {
        let invoice = Invoice::from_value(json!({
            "details": {
                "notes": "thanks!",
                "taxDetails": { "amount": 5, "amountType": "fixed" },
                "shippingDetails": { "cost": 3 },
                "items": [ { "quantity": 1, "unitPrice": 100 } ]
            }
        }))
        .unwrap();

        let details = process_invoice(invoice).details.unwrap();
        assert_eq!(details.additional_notes.as_deref(), Some("thanks!"));
        assert_eq!(details.tax, Some(Amount::fixed(5.0)));
        assert_eq!(details.tax_details, Some(Amount::fixed(5.0)));
        assert_eq!(details.shipping.as_ref().unwrap().cost, Some(3.0));
        // 100 + 5 fixed tax + 3 shipping
        assert_eq!(details.total_amount, Some(108.0));
    }

    #[test]
    fn stale_storage_identity_is_stripped() {
        let invoice = Invoice::from_value(json!({
            "_id": "abc",
            "userId": "def",
            "createdAt": "2024-01-01T00:00:00Z",
            "details": {}
        }))
        .unwrap();

        let processed = process_invoice(invoice);
        assert!(processed.extra.get("_id").is_none());
        assert!(processed.extra.get("userId").is_none());
        assert!(processed.extra.get("createdAt").is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn untaxed_totals_equal_the_item_sum(
                lines in proptest::collection::vec((0.0f64..1000.0, 0.0f64..1000.0), 0..20),
                shipping in 0.0f64..100.0,
            ) {
                let items: Vec<Item> = lines
                    .iter()
                    .map(|(q, p)| process_item(&item(*q, *p)))
                    .collect();

                let expected_sub: f64 = lines.iter().map(|(q, p)| q * p).sum();
                let totals = compute_totals(
                    &items,
                    Amount::default(),
                    Amount::default(),
                    &Shipping { cost: Some(shipping), ..Shipping::default() },
                );

                prop_assert!((totals.sub_total - expected_sub).abs() < 1e-6);
                prop_assert!((totals.total_amount - (expected_sub + shipping)).abs() < 1e-6);
                prop_assert_eq!(totals.total_tax, 0.0);
                prop_assert_eq!(totals.total_discount, 0.0);
            }

            #[test]
            fn processing_is_idempotent_on_items(
                q in 0.0f64..1000.0,
                p in 0.0f64..1000.0,
                tax in 0.0f64..50.0,
            ) {
                let mut it = item(q, p);
                it.tax = Some(Amount::percentage(tax));

                let once = process_item(&it);
                let twice = process_item(&once);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
