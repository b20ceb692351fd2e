use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlforge::{BuilderConfig, Dialect, QueryBuilder, param};

/// SELECT col0, col1, ... FROM t WHERE col0 = :p0 AND col1 = :p1 ... ORDER BY col0 DESC
fn build_select(dialect: Dialect, n: usize) -> QueryBuilder {
    let mut qb = BuilderConfig::new().dialect(dialect).query();
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    qb.select(columns.clone()).unwrap().from(["t"]).unwrap();
    for (i, column) in columns.iter().enumerate() {
        qb.where_(column.as_str(), "=", param(format!("p{i}"))).unwrap();
        qb.bind_named(format!("p{i}"), i as i64);
    }
    qb.newest("col0").unwrap().limit(50);
    qb
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::SqlServer] {
        for n in [1, 10, 50] {
            let qb = build_select(dialect, n);
            group.bench_with_input(
                BenchmarkId::new(dialect.as_str(), n),
                &qb,
                |b, qb| {
                    b.iter(|| black_box(qb.render().unwrap()));
                },
            );
        }
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");

    for n in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_select(Dialect::Postgres, n);
                black_box(qb.render().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_insert_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/insert_rows");

    for rows in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut qb = BuilderConfig::new().dialect(Dialect::MySql).query();
                qb.insert(["id", "name"]).unwrap().into("t").unwrap();
                for i in 0..rows {
                    qb.values((i as i64, format!("name-{i}"))).unwrap();
                }
                black_box(qb.render().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_build_and_render, bench_insert_rows);
criterion_main!(benches);
