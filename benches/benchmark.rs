//! Performance benchmarks for defmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use defmark::config::{Config, Sigils};
use defmark::correlate::Correlator;
use defmark::definitions::{SourceFormat, SourceId};
use defmark::markup::MarkupConverter;
use defmark::replace::Replacer;
use defmark::session::Session;
use defmark::sigils::SigilOperator;

const INPUT_BYTES: usize = 1 << 20;

fn generate_entries(num_keys: usize) -> Vec<(String, String)> {
    (0..num_keys)
        .map(|i| (format!("section{}.key{}", i % 97, i), format!("value {}", i)))
        .collect()
}

/// About 1 MB of prose with a reference every few words.
fn generate_document(num_keys: usize) -> String {
    let mut doc = String::with_capacity(INPUT_BYTES + 256);
    let mut i = 0;
    while doc.len() < INPUT_BYTES {
        let key = i % num_keys;
        doc.push_str(&format!(
            "Some words before {{{{section{}.key{}}}}} and after it.",
            key % 97,
            key
        ));
        if i % 8 == 7 {
            doc.push_str("\n\n");
        } else {
            doc.push(' ');
        }
        i += 1;
    }
    doc
}

fn generate_markdown(paragraphs: usize) -> String {
    let mut md = String::from("# Benchmark Document\n\n");
    for i in 0..paragraphs {
        match i % 4 {
            0 => md.push_str(&format!("## Section {}\n\n", i)),
            1 => md.push_str("- item one\n- item two\n\n"),
            2 => md.push_str("```\nlet x = 1;\n```\n\n"),
            _ => md.push_str(&format!("Paragraph {} with *emphasis* and text.\n\n", i)),
        }
    }
    md
}

fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace");
    group.sample_size(10);
    let operator = SigilOperator::new(Sigils::default()).unwrap();

    for num_keys in [100, 1_000, 10_000].iter() {
        let replacer = Replacer::new(generate_entries(*num_keys), &operator).unwrap();
        let doc = generate_document(*num_keys);
        group.bench_with_input(BenchmarkId::new("keys", num_keys), &doc, |b, doc| {
            b.iter(|| replacer.replace(black_box(doc)))
        });
    }
    group.finish();
}

fn bench_build_matcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matcher");
    let operator = SigilOperator::new(Sigils::default()).unwrap();

    for num_keys in [100, 1_000, 10_000].iter() {
        let entries = generate_entries(*num_keys);
        group.bench_with_input(BenchmarkId::new("keys", num_keys), &entries, |b, entries| {
            b.iter(|| Replacer::new(black_box(entries.clone()), &operator).unwrap())
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let converter = MarkupConverter::new(&Config::default().markup);

    for paragraphs in [10, 100, 1_000].iter() {
        let md = generate_markdown(*paragraphs);
        group.bench_with_input(BenchmarkId::new("blocks", paragraphs), &md, |b, md| {
            b.iter(|| converter.convert(black_box(md)).unwrap())
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let session = Session::new(Config::default()).unwrap();
    let yaml: String = generate_entries(1_000)
        .iter()
        .map(|(k, v)| format!("\"{}\": \"{}\"\n", k, v))
        .collect();
    session
        .load_source(SourceId::new("bench.yaml"), SourceFormat::Yaml, &yaml)
        .unwrap();
    let md = generate_markdown(1_000);

    c.bench_function("render_1k_blocks", |b| {
        b.iter(|| session.render(u64::MAX, black_box(&md)).unwrap())
    });
}

fn bench_correlate(c: &mut Criterion) {
    let correlator = Correlator::default();
    let md = generate_markdown(10_000);
    let lines: Vec<&str> = md.lines().collect();
    let last = lines.len() - 1;

    c.bench_function("approximate_anchor_10k", |b| {
        b.iter(|| correlator.approximate_anchor(black_box(&lines), last))
    });
}

criterion_group!(
    benches,
    bench_replace,
    bench_build_matcher,
    bench_convert,
    bench_render,
    bench_correlate,
);
criterion_main!(benches);
