//! Logical to physical naming
//!
//! [`ColumnProjection`] maps ordered property lists to the ordered column
//! names they occupy in a given store object, and derives constraint names.
//! Implementations must be deterministic: the compatibility checker compares
//! the projected sequences element by element.

use relmap_core::model::format_names;
use relmap_core::{ForeignKeyDescriptor, NamingConfig, Property, StoreObjectIdentifier};

/// Projection of properties onto physical columns
pub trait ColumnProjection: Send + Sync {
    /// Column a single property maps to in `store_object`
    fn column_name(&self, property: &Property, store_object: &StoreObjectIdentifier) -> String;

    /// Columns for an ordered property list, in the same order
    fn column_names(&self, properties: &[&Property], store_object: &StoreObjectIdentifier) -> Vec<String> {
        properties
            .iter()
            .map(|property| self.column_name(property, store_object))
            .collect()
    }

    /// Name of the constraint `foreign_key` produces in `store_object`
    fn constraint_name(&self, foreign_key: &ForeignKeyDescriptor<'_>, store_object: &StoreObjectIdentifier) -> String {
        if let Some(name) = foreign_key.constraint_name() {
            return name.to_string();
        }

        let columns = self.column_names(foreign_key.properties(), store_object);
        default_constraint_name(store_object, foreign_key.principal_table(), &columns, usize::MAX)
    }
}

/// Projection driven by explicit names, per-table overrides and a naming convention
#[derive(Debug, Clone, Default)]
pub struct ConventionProjection {
    naming: NamingConfig,
}

impl ConventionProjection {
    pub fn new(naming: NamingConfig) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }
}

impl ColumnProjection for ConventionProjection {
    fn column_name(&self, property: &Property, store_object: &StoreObjectIdentifier) -> String {
        if let Some(name) = property.override_for(store_object) {
            return name.to_string();
        }

        match &property.column_name {
            Some(name) => name.clone(),
            None => self.naming.convention.apply(&property.name),
        }
    }

    fn constraint_name(&self, foreign_key: &ForeignKeyDescriptor<'_>, store_object: &StoreObjectIdentifier) -> String {
        if let Some(name) = foreign_key.constraint_name() {
            return name.to_string();
        }

        let columns = self.column_names(foreign_key.properties(), store_object);
        default_constraint_name(
            store_object,
            foreign_key.principal_table(),
            &columns,
            self.naming.max_identifier_length,
        )
    }
}

/// `FK_{table}_{principal}_{col1}_{col2}`, truncated to `max_length` characters
pub fn default_constraint_name(
    store_object: &StoreObjectIdentifier,
    principal_table: &StoreObjectIdentifier,
    columns: &[String],
    max_length: usize,
) -> String {
    let mut name = format!("FK_{}_{}", store_object.name(), principal_table.name());
    for column in columns {
        name.push('_');
        name.push_str(column);
    }

    truncate(name, max_length)
}

fn truncate(name: String, max_length: usize) -> String {
    if max_length == 0 || name.chars().count() <= max_length {
        return name;
    }
    name.chars().take(max_length).collect()
}

/// Render column names as `{'a', 'b'}`
pub fn format_columns(columns: &[String]) -> String {
    format_names(columns.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::NamingConvention;

    fn orders() -> StoreObjectIdentifier {
        StoreObjectIdentifier::table("Orders", Some("dbo")).unwrap()
    }

    #[test]
    fn convention_applies_without_explicit_name() {
        let projection = ConventionProjection::new(NamingConfig {
            convention: NamingConvention::SnakeCase,
            ..NamingConfig::default()
        });

        let property = Property::new("CustomerId");
        assert_eq!(projection.column_name(&property, &orders()), "customer_id");
    }

    #[test]
    fn explicit_column_name_wins_over_convention() {
        let projection = ConventionProjection::new(NamingConfig {
            convention: NamingConvention::UpperCase,
            ..NamingConfig::default()
        });

        let property = Property::new("CustomerId").with_column_name("cust");
        assert_eq!(projection.column_name(&property, &orders()), "cust");
    }

    #[test]
    fn store_object_override_wins_in_its_table_only() {
        let projection = ConventionProjection::default();
        let details = StoreObjectIdentifier::table("OrderDetails", Some("dbo")).unwrap();
        let property = Property::new("CustomerId")
            .with_column_name("CustomerKey")
            .with_override(details.clone(), "DetailCustomer");

        assert_eq!(projection.column_name(&property, &details), "DetailCustomer");
        assert_eq!(projection.column_name(&property, &orders()), "CustomerKey");
    }

    #[test]
    fn column_names_preserve_order() {
        let projection = ConventionProjection::default();
        let a = Property::new("B");
        let b = Property::new("A");
        assert_eq!(projection.column_names(&[&a, &b], &orders()), vec!["B", "A"]);
    }

    #[test]
    fn default_name_includes_tables_and_columns() {
        let customers = StoreObjectIdentifier::table("Customers", Some("dbo")).unwrap();
        let name = default_constraint_name(
            &orders(),
            &customers,
            &["CustomerId".to_string(), "Region".to_string()],
            128,
        );
        assert_eq!(name, "FK_Orders_Customers_CustomerId_Region");
    }

    #[test]
    fn default_name_is_truncated() {
        let customers = StoreObjectIdentifier::table("Customers", None).unwrap();
        let name = default_constraint_name(&orders(), &customers, &["CustomerId".to_string()], 12);
        assert_eq!(name, "FK_Orders_Cu");
    }

    #[test]
    fn columns_format() {
        assert_eq!(format_columns(&["a".to_string(), "b".to_string()]), "{'a', 'b'}");
    }
}
