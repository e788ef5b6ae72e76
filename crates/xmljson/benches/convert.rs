use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use xmljson::{convert, convert_node, from_xml_str, to_json};

const PERSON_XML: &str = r#"<person id="7"><name>Ada</name><tag>x</tag><tag>y</tag></person>"#;

fn catalog(items: usize) -> String {
    let mut xml = String::from("<catalog>");
    for i in 0..items {
        xml.push_str(&format!(
            "<book id=\"bk{i}\"><title>Title {i}</title><price currency=\"USD\">{i}.95</price></book>"
        ));
    }
    xml.push_str("</catalog>");
    xml
}

fn bench_convert_text(c: &mut Criterion) {
    c.bench_function("convert_person", |b| {
        b.iter(|| convert(black_box(PERSON_XML)))
    });
}

fn bench_convert_catalog(c: &mut Criterion) {
    let xml = catalog(500);
    c.bench_function("convert_catalog_500", |b| {
        b.iter(|| to_json(black_box(xml.as_str())))
    });
}

fn bench_convert_parsed(c: &mut Criterion) {
    let xml = catalog(500);
    let Ok(doc) = from_xml_str(&xml) else {
        return;
    };
    c.bench_function("convert_node_catalog_500", |b| {
        b.iter(|| convert_node(black_box(&doc.root)))
    });
}

criterion_group!(
    benches,
    bench_convert_text,
    bench_convert_catalog,
    bench_convert_parsed
);
criterion_main!(benches);
