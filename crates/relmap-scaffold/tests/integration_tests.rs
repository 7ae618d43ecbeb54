//! Integration tests for the database model factory
//!
//! Runs the mock factory end to end: table selection, error simulation and
//! the shape of the resulting model.

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use relmap_core::StoreObjectIdentifier;
use relmap_scaffold::{
    DatabaseColumn, DatabaseModelFactory, DatabaseModelFactoryOptions, MockDatabaseModelFactory, ScaffoldError,
    TableRef,
};

// =============================================================================
// Column Model
// =============================================================================

#[test]
fn test_column_display() {
    assert_eq!(format!("{}", DatabaseColumn::new("")), "<UNKNOWN>");
    assert_eq!(format!("{}", DatabaseColumn::new("CustomerId")), "CustomerId");
}

#[test]
fn test_columns_point_back_to_their_table() {
    let table = orders_table();
    for column in table.columns() {
        assert_eq!(column.table, Some(TableRef::new(Some("dbo"), "Orders")));
    }
}

#[test]
fn test_duplicate_column_is_rejected() {
    let mut table = customers_table();
    let result = table.add_column(DatabaseColumn::new("Email"));

    assert!(matches!(result, Err(ScaffoldError::DuplicateColumn { .. })));
    assert_eq!(table.column_names(), vec!["CustomerId", "Email", "DisplayName"]);
}

// =============================================================================
// Mock Factory
// =============================================================================

#[tokio::test]
async fn test_create_selects_all_tables_by_default() {
    let factory = shop_factory();
    let model = factory.create(&DatabaseModelFactoryOptions::new()).await.unwrap();

    assert_eq!(model.database_name.as_deref(), Some("Shop"));
    assert_eq!(model.tables().len(), 3);

    let invoices = model.find_table(Some("sales"), "Invoices").unwrap();
    let gross = invoices.column("Gross").unwrap();
    assert!(gross.is_computed());
    assert_eq!(gross.is_stored, Some(true));
    assert_eq!(model.table_of(gross).unwrap().name, "Invoices");
}

#[tokio::test]
async fn test_create_filters_by_schema() {
    let factory = shop_factory();
    let options = DatabaseModelFactoryOptions::new().with_schema("sales");

    let model = factory.create(&options).await.unwrap();
    let names: Vec<String> = model.tables().iter().map(|t| t.to_string()).collect();
    assert_eq!(names, vec!["sales.Invoices"]);
}

#[tokio::test]
async fn test_create_filters_by_table() {
    let factory = shop_factory();
    let options = DatabaseModelFactoryOptions::new()
        .with_table("dbo.Orders")
        .with_table("Missing");

    let model = factory.create(&options).await.unwrap();
    assert_eq!(model.tables().len(), 1);
    assert_eq!(model.tables()[0].name, "Orders");
}

#[tokio::test]
async fn test_create_propagates_table_error() {
    let factory = shop_factory();
    factory
        .add_error_for_table("sales.Invoices", ScaffoldError::Query("timeout".to_string()))
        .await;

    let result = factory.create(&DatabaseModelFactoryOptions::new()).await;
    assert_eq!(result.unwrap_err(), ScaffoldError::Query("timeout".to_string()));

    factory.clear_errors().await;
    assert!(factory.create(&DatabaseModelFactoryOptions::new()).await.is_ok());
}

#[tokio::test]
async fn test_factory_as_trait_object() {
    let factories: Vec<Box<dyn DatabaseModelFactory>> = vec![
        Box::new(shop_factory()),
        Box::new(MockDatabaseModelFactory::new().with_name("Empty")),
    ];

    let mut counts = Vec::new();
    for factory in &factories {
        factory.test_connection().await.unwrap();
        let model = factory.create(&DatabaseModelFactoryOptions::new()).await.unwrap();
        counts.push((factory.name(), model.tables().len()));
    }

    assert_eq!(counts, vec![("Mock", 3), ("Empty", 0)]);
}

#[tokio::test]
async fn test_concurrent_creates() {
    let factory = shop_factory();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let factory = factory.clone();
            tokio::spawn(async move { factory.create(&DatabaseModelFactoryOptions::new()).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().tables().len(), 3);
    }
}

#[tokio::test]
async fn test_latency_is_simulated() {
    let factory = MockDatabaseModelFactory::new().with_latency(20);
    let start = std::time::Instant::now();

    factory.test_connection().await.unwrap();
    assert!(start.elapsed() >= std::time::Duration::from_millis(20));
}

// =============================================================================
// Bridging to the logical model
// =============================================================================

#[tokio::test]
async fn test_tables_map_to_store_objects() {
    let model = shop_factory().create(&DatabaseModelFactoryOptions::new()).await.unwrap();
    let orders = model.find_table(Some("dbo"), "Orders").unwrap();

    let id = orders.table_ref().to_store_object().unwrap();
    assert_eq!(id, StoreObjectIdentifier::table("orders", Some("dbo")).unwrap());
}

#[tokio::test]
async fn test_model_serializes_to_json() {
    let model = shop_factory()
        .create(&DatabaseModelFactoryOptions::new().with_table("Customers"))
        .await
        .unwrap();

    let json = serde_json::to_value(&model).unwrap();
    let columns = &json["tables"][0]["columns"];
    assert_eq!(columns[0]["name"], "CustomerId");
    assert_eq!(columns[0]["value_generated"], "on_add");
    assert_eq!(columns[2]["is_nullable"], true);
    assert_eq!(columns[2]["table"]["schema"], "dbo");
}
