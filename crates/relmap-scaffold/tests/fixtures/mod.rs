//! Test fixtures for database model factory tests
//!
//! A small shop database: `dbo.Customers`, `dbo.Orders` and `sales.Invoices`,
//! with a mix of nullable, computed and generated columns.

#![allow(dead_code)]

use relmap_scaffold::{DatabaseColumn, DatabaseTable, MockDatabaseModelFactory, MockDatabaseModelFactoryBuilder, ValueGenerated};

pub fn customers_table() -> DatabaseTable {
    DatabaseTable::new(Some("dbo"), "Customers")
        .with_comment("Registered customers")
        .with_column(
            DatabaseColumn::new("CustomerId")
                .with_store_type("int")
                .with_value_generated(ValueGenerated::OnAdd),
        )
        .and_then(|t| t.with_column(DatabaseColumn::new("Email").with_store_type("nvarchar(256)")))
        .and_then(|t| {
            t.with_column(
                DatabaseColumn::new("DisplayName")
                    .with_store_type("nvarchar(100)")
                    .with_nullable(true)
                    .with_collation("Latin1_General_CI_AS"),
            )
        })
        .expect("fixture columns are unique")
}

pub fn orders_table() -> DatabaseTable {
    DatabaseTable::new(Some("dbo"), "Orders")
        .with_column(DatabaseColumn::new("OrderId").with_store_type("int"))
        .and_then(|t| t.with_column(DatabaseColumn::new("CustomerId").with_store_type("int")))
        .and_then(|t| {
            t.with_column(
                DatabaseColumn::new("PlacedAt")
                    .with_store_type("datetime2")
                    .with_default_value_sql("(getutcdate())"),
            )
        })
        .and_then(|t| {
            t.with_column(
                DatabaseColumn::new("RowVersion")
                    .with_store_type("rowversion")
                    .with_value_generated(ValueGenerated::OnAddOrUpdate),
            )
        })
        .expect("fixture columns are unique")
}

pub fn invoices_table() -> DatabaseTable {
    DatabaseTable::new(Some("sales"), "Invoices")
        .with_column(DatabaseColumn::new("InvoiceId").with_store_type("int"))
        .and_then(|t| t.with_column(DatabaseColumn::new("Net").with_store_type("decimal(18,2)")))
        .and_then(|t| {
            t.with_column(
                DatabaseColumn::new("Gross")
                    .with_store_type("decimal(18,2)")
                    .with_computed_column_sql("[Net] * 1.2", Some(true))
                    .with_comment("Net plus tax"),
            )
        })
        .expect("fixture columns are unique")
}

/// Factory serving all three shop tables
pub fn shop_factory() -> MockDatabaseModelFactory {
    MockDatabaseModelFactoryBuilder::new()
        .with_database_name("Shop")
        .with_default_schema("dbo")
        .with_table(customers_table())
        .with_table(orders_table())
        .with_table(invoices_table())
        .build()
}
