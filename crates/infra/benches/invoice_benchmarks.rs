use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use billbook_core::{ClientId, Money, ProductId};
use billbook_infra::store::{ClientRepository, InMemoryStore, ProductRepository};
use billbook_infra::{CreateInvoiceRequest, InvoiceTransactionManager};
use billbook_invoicing::{InvoiceDraft, RequestedLines};
use billbook_parties::{Client, ClientDetails, ContactInfo};
use billbook_products::Product;
use chrono::NaiveDate;
use tokio::runtime::Runtime;

const LARGE_STOCK: u32 = u32::MAX;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Store with one client and `product_count` products, each with effectively unlimited stock.
fn seeded_store(rt: &Runtime, product_count: usize) -> (InMemoryStore, ClientId, Vec<ProductId>) {
    rt.block_on(async {
        let store = InMemoryStore::new();
        let client = Client::register(
            ClientId::new(),
            ClientDetails {
                name: "Bench Client".to_string(),
                contact: ContactInfo::default(),
            },
        )
        .unwrap();
        store.insert_client(&client).await.unwrap();

        let mut products = Vec::with_capacity(product_count);
        for i in 0..product_count {
            let product = Product::from_parts(
                ProductId::new(),
                format!("Item {i}"),
                Money::from_cents(199 + i as i64),
                LARGE_STOCK,
            );
            store.insert_product(&product).await.unwrap();
            products.push(product.id_typed());
        }

        (store, client.id_typed(), products)
    })
}

fn bench_draft_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("draft_pricing");
    let issue_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for line_count in [1usize, 10, 100].iter() {
        let products: Vec<Product> = (0..*line_count)
            .map(|i| {
                Product::from_parts(
                    ProductId::new(),
                    format!("Item {i}"),
                    Money::from_cents(250),
                    LARGE_STOCK,
                )
            })
            .collect();

        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &products,
            |b, products| {
                b.iter(|| {
                    let mut draft = InvoiceDraft::new(
                        billbook_core::InvoiceId::new(),
                        ClientId::new(),
                        issue_date,
                    );
                    for product in products {
                        draft.add_line(product, 3).unwrap();
                    }
                    black_box(draft.finish())
                });
            },
        );
    }

    group.finish();
}

fn bench_create_invoice(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_invoice_in_memory");
    let rt = runtime();

    for line_count in [0usize, 1, 10, 50].iter() {
        let (store, client_id, products) = seeded_store(&rt, *line_count);
        let manager = InvoiceTransactionManager::new(store);
        let lines: RequestedLines = products.iter().map(|id| (*id, 1)).collect();
        let request = CreateInvoiceRequest::new(client_id, lines);

        group.throughput(Throughput::Elements((*line_count).max(1) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &request,
            |b, request| {
                b.iter(|| {
                    let invoice = rt.block_on(manager.create_invoice(request)).unwrap();
                    black_box(invoice)
                });
            },
        );
    }

    group.finish();
}

fn bench_form_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_parsing");
    let form: Vec<(ProductId, String)> = (0..100)
        .map(|i| {
            let raw = match i % 4 {
                0 => "0".to_string(),
                1 => "abc".to_string(),
                _ => i.to_string(),
            };
            (ProductId::new(), raw)
        })
        .collect();

    group.throughput(Throughput::Elements(form.len() as u64));
    group.bench_function("from_form_100_fields", |b| {
        b.iter(|| {
            let lines = RequestedLines::from_form(form.iter().map(|(id, raw)| (*id, raw.as_str())));
            black_box(lines.len())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_draft_pricing,
    bench_create_invoice,
    bench_form_parsing
);
criterion_main!(benches);
