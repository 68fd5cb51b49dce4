use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use livegrid::*;

fn grid(size: usize) -> ElementRef {
    let rows: Vec<Vec<String>> = (0..size)
        .map(|i| {
            vec![
                format!("Name {}", (i * 7919) % size),
                ((i * 31) % 1000).to_string(),
                format!("City {}", i % 50),
            ]
        })
        .collect();
    build_table(&["Name", "Score", "City"], &rows)
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let element = grid(size);
                DataTable::new(black_box(&element), Options::default()).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_sort_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_cold");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || DataTable::new(&grid(size), Options::default()).unwrap(),
                |mut table| table.order(Some((1, SortDirection::Desc))).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_sort_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_cached");

    for size in [100, 1000, 10000].iter() {
        let element = grid(*size);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.order(Some((0, SortDirection::Asc))).unwrap();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| table.header_click(black_box(0)).unwrap());
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 10000].iter() {
        let element = grid(*size);
        let mut table = DataTable::new(&element, Options::default()).unwrap();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| table.search(black_box("City 1")).unwrap());
        });
    }
    group.finish();
}

fn bench_smart_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("smart_search");

    for size in [1000, 10000].iter() {
        let element = grid(*size);
        let mut table = DataTable::new(&element, Options::default()).unwrap();
        table.set_smart_search(true).unwrap();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| table.search(black_box("city \"name 1\" !7")).unwrap());
        });
    }
    group.finish();
}

fn bench_page_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_through");

    for size in [1000, 10000].iter() {
        let element = grid(*size);
        let mut table = DataTable::new(&element, Options::default()).unwrap();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                table.page(PageAction::First).unwrap();
                while table.page(PageAction::Next).unwrap() {}
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_construct,
    bench_sort_cold,
    bench_sort_cached,
    bench_search,
    bench_smart_search,
    bench_page_through
);
criterion_main!(benches);
