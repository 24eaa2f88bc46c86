use criterion::{Criterion, black_box, criterion_group, criterion_main};

use billfold_invoices::{Amount, Details, Invoice, Item, process_invoice};

fn synthetic_invoice(lines: usize) -> Invoice {
    let items = (0..lines)
        .map(|i| Item {
            name: Some(format!("Line {i}")),
            quantity: Some((i % 7 + 1) as f64),
            unit_price: Some(19.99 + i as f64),
            tax: Some(Amount::percentage(19.0)),
            discount: Some(Amount::fixed(1.5)),
            ..Item::default()
        })
        .collect();

    Invoice {
        details: Some(Details {
            invoice_number: Some("BENCH-1".into()),
            items: Some(items),
            tax: Some(Amount::percentage(7.0)),
            ..Details::default()
        }),
        ..Invoice::default()
    }
}

fn bench_process_invoice(c: &mut Criterion) {
    let invoice = synthetic_invoice(50);
    c.bench_function("process_invoice/50_lines", |b| {
        b.iter(|| process_invoice(black_box(invoice.clone())))
    });
}

criterion_group!(benches, bench_process_invoice);
criterion_main!(benches);
