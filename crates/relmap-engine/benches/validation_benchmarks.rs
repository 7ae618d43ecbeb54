//! Benchmarks for the shared foreign key validation pass
//!
//! Models are generated with N dependent entity types that all share one
//! table, so every foreign key lands in the same constraint group.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relmap_core::{Config, DeleteBehavior, EntityType, ForeignKey, Model};
use relmap_engine::{are_compatible, ConventionProjection, ForeignKeyValidator};

/// Generate a model with `num_dependents` entity types sharing `dbo.Lines`
fn generate_shared_model(num_dependents: usize) -> Model {
    let mut entity_types = vec![EntityType::new("Order")
        .with_table("Orders", Some("dbo"))
        .with_properties(["OrderId", "StoreId"])
        .with_primary_key(["OrderId", "StoreId"])];

    for i in 0..num_dependents {
        entity_types.push(
            EntityType::new(format!("Line{}", i))
                .with_table("Lines", Some("dbo"))
                .with_properties(["Id", "OrderId", "StoreId"])
                .with_foreign_key(
                    ForeignKey::new(["OrderId", "StoreId"], "Order")
                        .with_delete_behavior(DeleteBehavior::Cascade),
                ),
        );
    }

    Model::new(entity_types)
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_shared_table");
    let validator = ForeignKeyValidator::from_config(&Config::default());

    for size in [10usize, 100, 1000] {
        let model = generate_shared_model(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &model, |b, model| {
            b.iter(|| validator.validate(black_box(model)).map(|o| o.shared.len()))
        });
    }

    group.finish();
}

fn bench_single_check(c: &mut Criterion) {
    let model = generate_shared_model(2);
    let fks = model.resolve_foreign_keys(None).expect("model resolves");
    let store_object = fks[0].declaring_table().clone();
    let projection = ConventionProjection::default();

    c.bench_function("are_compatible", |b| {
        b.iter(|| are_compatible(black_box(&fks[0]), black_box(&fks[1]), &store_object, &projection).is_compatible())
    });
}

criterion_group!(benches, bench_validation, bench_single_check);
criterion_main!(benches);
