//! Benchmarks for folio structuring and pagination.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic contracts with numbered sections.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use folio::{Direction, Editor, PaginateOptions, ParseOptions, TextMetricsMeasurer};

/// Creates a synthetic contract with the given number of sections.
fn create_contract(section_count: usize) -> String {
    let mut html = String::new();
    for i in 0..section_count {
        html.push_str(&format!("<h1>Article {}</h1>", i + 1));
        html.push_str(&format!(
            "<p>The parties agree that clause {} applies to all obligations arising under this agreement, \
             including <strong>payment</strong> and <em>delivery</em> terms.</p>",
            i + 1
        ));
        html.push_str("<ul><li><p>First condition</p></li><li><p>Second condition</p></li></ul>");
        if i % 10 == 9 {
            html.push_str(r#"<div data-type="page-break" class="page-break"></div>"#);
        }
    }
    html
}

/// Benchmark HTML parsing at various sizes.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_html");

    for section_count in [10, 100].iter() {
        let html = create_contract(*section_count);

        group.bench_function(format!("{}_sections", section_count), |b| {
            b.iter(|| folio::parse_html(black_box(&html), &ParseOptions::default()));
        });
    }

    group.finish();
}

/// Benchmark pagination with the text metrics estimator.
fn bench_pagination(c: &mut Criterion) {
    let html = create_contract(200);
    let measurer = TextMetricsMeasurer::default();
    let mut group = c.benchmark_group("paginate");

    group.bench_function("manual_only", |b| {
        b.iter(|| folio::paginate::paginate_manual(black_box(&html)));
    });

    group.bench_function("sequential", |b| {
        let options = PaginateOptions::new();
        b.iter(|| folio::paginate(black_box(&html), Some(&measurer), &options));
    });

    group.bench_function("parallel", |b| {
        let options = PaginateOptions::new().with_parallel(true);
        b.iter(|| folio::paginate(black_box(&html), Some(&measurer), &options));
    });

    group.finish();
}

/// Benchmark a section move including outline refresh.
fn bench_section_move(c: &mut Criterion) {
    let html = create_contract(100);

    c.bench_function("move_section", |b| {
        b.iter_batched(
            || Editor::from_html(&html, &ParseOptions::default()).unwrap(),
            |mut editor| editor.move_section(black_box(50), Direction::Up).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_parsing, bench_pagination, bench_section_move);
criterion_main!(benches);
