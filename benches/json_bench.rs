use criterion::{criterion_group, criterion_main, Criterion};
use text_formats::json::{parse, to_string, Layout, ParseOptions, WriteOptions};

fn bench_parse_small_object(c: &mut Criterion) {
    let input = br#"{"a":1,"b":[true,null,"x"],"c":{"d":3.5}}"#;
    c.bench_function("json_parse_small_object", |b| {
        b.iter(|| parse(std::hint::black_box(input), &ParseOptions::default()).unwrap());
    });
}

fn bench_parse_large_array(c: &mut Criterion) {
    let mut input = String::from("[");
    for i in 0..5000 {
        if i > 0 {
            input.push(',');
        }
        input.push_str(&format!(r#"{{"id":{i},"value":{}}}"#, i * 2));
    }
    input.push(']');
    let bytes = input.into_bytes();
    c.bench_function("json_parse_large_array", |b| {
        b.iter(|| parse(std::hint::black_box(&bytes), &ParseOptions::default()).unwrap());
    });
}

fn bench_write_pretty(c: &mut Criterion) {
    let input = br#"{"a":1,"b":[true,null,"x"],"c":{"d":3.5}}"#;
    let value = parse(input, &ParseOptions::default()).unwrap();
    let pretty = WriteOptions { layout: Layout::Pretty, ..WriteOptions::default() };
    c.bench_function("json_write_pretty", |b| {
        b.iter(|| to_string(std::hint::black_box(&value), &pretty).unwrap());
    });
}

criterion_group!(benches, bench_parse_small_object, bench_parse_large_array, bench_write_pretty);
criterion_main!(benches);
