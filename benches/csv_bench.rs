use criterion::{criterion_group, criterion_main, Criterion};
use text_formats::csv::{parse, write_table, ParseOptions, WriteOptions};

fn bench_parse_small_table(c: &mut Criterion) {
    let input = b"name,age,city\nAlice,30,\"New, York\"\nBob,25,Boston\nCarol,40,Denver\n";
    c.bench_function("csv_parse_small_table", |b| {
        b.iter(|| parse(std::hint::black_box(input), &ParseOptions::default()).unwrap());
    });
}

fn bench_parse_large_table(c: &mut Criterion) {
    let mut input = String::from("id,value,note\n");
    for i in 0..5000 {
        input.push_str(&format!("{i},{},row {i}\n", i * 2));
    }
    let bytes = input.into_bytes();
    c.bench_function("csv_parse_large_table", |b| {
        b.iter(|| parse(std::hint::black_box(&bytes), &ParseOptions::default()).unwrap());
    });
}

fn bench_write_table(c: &mut Criterion) {
    let input = b"name,age,city\nAlice,30,\"New, York\"\nBob,25,Boston\n";
    let table = parse(input, &ParseOptions::default()).unwrap();
    c.bench_function("csv_write_table", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            write_table(std::hint::black_box(&table), &WriteOptions::default(), &mut out).unwrap();
            out
        });
    });
}

criterion_group!(benches, bench_parse_small_table, bench_parse_large_table, bench_write_table);
criterion_main!(benches);
