//! Test fixtures for compatibility and validation tests
//!
//! Two dependent entity types (`OrderLine` and `OrderLineAudit`) share the
//! `dbo.OrderLines` table, so their foreign keys land on the same physical
//! constraint. Principals live in `dbo.Orders`, `Sales.Orders` and a
//! differently-cased `DBO.ORDERS`.

#![allow(dead_code)]

use relmap_core::{
    DeleteBehavior, EntityType, ForeignKey, ForeignKeyDescriptor, Model, Property, StoreObjectIdentifier,
};
use relmap_engine::{ColumnProjection, ConventionProjection};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Principal with a two-column key in `dbo.Orders`
pub fn order() -> EntityType {
    EntityType::new("Order")
        .with_table("Orders", Some("dbo"))
        .with_properties(["OrderId", "StoreId"])
        .with_primary_key(["OrderId", "StoreId"])
}

/// Principal with the same key shape in `Sales.Orders`
pub fn sales_order() -> EntityType {
    EntityType::new("SalesOrder")
        .with_table("Orders", Some("Sales"))
        .with_properties(["OrderId", "StoreId"])
        .with_primary_key(["OrderId", "StoreId"])
}

/// Principal mapped to `DBO.ORDERS`
pub fn shouted_order() -> EntityType {
    EntityType::new("LegacyOrder")
        .with_table("ORDERS", Some("DBO"))
        .with_properties(["OrderId", "StoreId"])
        .with_primary_key(["OrderId", "StoreId"])
}

/// Dependent entity mapped to `dbo.OrderLines`
pub fn line(name: &str, foreign_key: ForeignKey) -> EntityType {
    EntityType::new(name)
        .with_table("OrderLines", Some("dbo"))
        .with_property(Property::new("Id"))
        .with_property(Property::new("OrderId"))
        .with_property(Property::new("StoreId"))
        .with_property(Property::new("LegacyOrderRef").with_column_name("OrderRef"))
        .with_foreign_key(foreign_key)
}

/// Unique, cascading foreign key over (`OrderId`, `StoreId`) to `Order`
pub fn order_fk() -> ForeignKey {
    ForeignKey::new(["OrderId", "StoreId"], "Order")
        .with_unique(true)
        .with_delete_behavior(DeleteBehavior::Cascade)
}

/// Model whose two dependents declare `first` and `second`
pub fn shared_table_model(first: ForeignKey, second: ForeignKey) -> Model {
    Model::new(vec![
        order(),
        sales_order(),
        shouted_order(),
        line("OrderLine", first),
        line("OrderLineAudit", second),
    ])
}

/// The `dbo.OrderLines` store object
pub fn order_lines() -> StoreObjectIdentifier {
    StoreObjectIdentifier::table("OrderLines", Some("dbo")).unwrap()
}

/// The two resolved descriptors of a [`shared_table_model`]
pub fn descriptors(model: &Model) -> (ForeignKeyDescriptor<'_>, ForeignKeyDescriptor<'_>) {
    let mut fks = model.resolve_foreign_keys(None).unwrap();
    assert_eq!(fks.len(), 2);
    let second = fks.pop().unwrap();
    let first = fks.pop().unwrap();
    (first, second)
}

/// Projection that counts column lookups
#[derive(Default)]
pub struct CountingProjection {
    inner: ConventionProjection,
    calls: AtomicUsize,
}

impl CountingProjection {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ColumnProjection for CountingProjection {
    fn column_name(&self, property: &Property, store_object: &StoreObjectIdentifier) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.column_name(property, store_object)
    }

    fn constraint_name(&self, foreign_key: &ForeignKeyDescriptor<'_>, store_object: &StoreObjectIdentifier) -> String {
        self.inner.constraint_name(foreign_key, store_object)
    }
}
