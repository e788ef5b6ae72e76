use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use xmljson::from_xml_str;

const SIMPLE_XML: &str = "<root><child>text</child></root>";
const ATTR_XML: &str = "<root id=\"1\" name='test'><item value=\"42\" /><!-- c --></root>";

fn bench_simple(c: &mut Criterion) {
    c.bench_function("xml_parse_simple", |b| {
        b.iter(|| from_xml_str(black_box(SIMPLE_XML)))
    });
}

fn bench_attr(c: &mut Criterion) {
    c.bench_function("xml_parse_attr", |b| {
        b.iter(|| from_xml_str(black_box(ATTR_XML)))
    });
}

criterion_group!(benches, bench_simple, bench_attr);
criterion_main!(benches);
