use std::hint::black_box;
use std::io::Cursor;

use catalog_ingest::inference::infer;
use criterion::{Criterion, criterion_group, criterion_main};

fn wide_csv(columns: usize, rows: usize) -> Vec<u8> {
    let header: Vec<String> = (0..columns).map(|i| format!("col_{i}")).collect();
    let mut out = header.join(",");
    out.push('\n');
    for r in 0..rows {
        let row: Vec<String> = (0..columns).map(|c| (r * c).to_string()).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

fn sparse_json(records: usize, keys: usize) -> Vec<u8> {
    let items: Vec<String> = (0..records)
        .map(|r| {
            let fields: Vec<String> = (0..keys)
                .filter(|k| (r + k) % 3 != 0)
                .map(|k| format!("\"key_{k}\":{r}"))
                .collect();
            format!("{{{}}}", fields.join(","))
        })
        .collect();
    format!("[{}]", items.join(",")).into_bytes()
}

fn bench_inference(c: &mut Criterion) {
    let csv = wide_csv(200, 10_000);
    c.bench_function("infer_csv_header_200_cols", |b| {
        b.iter(|| {
            let mut input = Cursor::new(black_box(csv.as_slice()));
            infer(&mut input, "wide.csv").unwrap()
        })
    });

    let json = sparse_json(5_000, 40);
    c.bench_function("infer_json_5000_sparse_records", |b| {
        b.iter(|| {
            let mut input = Cursor::new(black_box(json.as_slice()));
            infer(&mut input, "sparse.json").unwrap()
        })
    });
}

criterion_group!(benches, bench_inference);
criterion_main!(benches);
