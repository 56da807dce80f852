use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_data_cleaning::operators::{
    EncodingMethod, MissingStrategy, OperatorParams, OperatorRegistry, OutlierMethod,
    ScalingMethod,
};
use rust_data_cleaning::types::{DataType, Field, Schema, Table, Value};

const ROWS: usize = 20_000;

fn synthetic_table() -> Table {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("x", DataType::Float64),
        Field::new("y", DataType::Float64),
        Field::new("city", DataType::Utf8),
    ]);
    let cities = ["Oslo", "Rome", "Paris", "Lima", "Kyiv"];
    let rows = (0..ROWS)
        .map(|i| {
            let x = if i % 97 == 0 {
                Value::Null
            } else {
                Value::Float64((i % 1000) as f64 * 0.5)
            };
            let y = if i % 5003 == 0 { 1.0e6 } else { (i % 37) as f64 };
            vec![
                Value::Int64((i % (ROWS / 2)) as i64),
                x,
                Value::Float64(y),
                Value::Utf8(cities[i % cities.len()].to_string()),
            ]
        })
        .collect();
    Table::new(schema, rows)
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn bench_operators(c: &mut Criterion) {
    let table = synthetic_table();
    let registry = OperatorRegistry::default();

    let cases = [
        (
            "handle_missing_fill_median",
            OperatorParams::HandleMissing {
                column: "x".into(),
                strategy: MissingStrategy::FillMedian,
            },
        ),
        (
            "handle_outliers_zscore",
            OperatorParams::HandleOutliers {
                method: OutlierMethod::ZScore,
                columns: columns(&["x", "y"]),
            },
        ),
        (
            "handle_outliers_iqr",
            OperatorParams::HandleOutliers {
                method: OutlierMethod::Iqr,
                columns: columns(&["x", "y"]),
            },
        ),
        ("drop_duplicates", OperatorParams::DropDuplicates),
        (
            "encode_one_hot",
            OperatorParams::EncodeCategorical {
                method: EncodingMethod::OneHot,
                columns: columns(&["city"]),
            },
        ),
        (
            "scale_standard",
            OperatorParams::ScaleFeatures {
                method: ScalingMethod::Standard,
                columns: columns(&["x", "y"]),
            },
        ),
    ];

    for (name, params) in &cases {
        let op = match registry.by_kind(params.kind()) {
            Some(op) => op,
            None => continue,
        };
        c.bench_function(name, |b| {
            b.iter(|| op.apply(black_box(&table), black_box(params)))
        });
    }
}

criterion_group!(benches, bench_operators);
criterion_main!(benches);
