//! # Catalog Types
//!
//! The externally supplied table catalog: the wire shape of
//! `GET {base_url}/erd_tables.json` and its conversion into diagram columns.
//!
//! Parsing is deliberately lenient at the container level — a missing or
//! non-array `tables` field is an empty catalog, matching the upstream
//! producer's "nothing loaded yet" responses — but strict at the element
//! level: a malformed table entry is a parse error, surfaced to the user as
//! a sync failure.

use crate::primitives::DEFAULT_CATALOG_COLUMN_TYPE;
use crate::types::Column;
use serde::de::{Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One column of a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub pk: bool,
    #[serde(default)]
    pub fk: Option<String>,
}

impl CatalogColumn {
    /// Convert to a diagram column, defaulting a missing/blank type.
    #[must_use]
    pub fn into_column(self) -> Column {
        let ty = if self.ty.is_empty() {
            DEFAULT_CATALOG_COLUMN_TYPE.to_string()
        } else {
            self.ty
        };
        Column {
            name: self.name,
            ty,
            pk: self.pk,
            fk: self.fk,
        }
    }
}

/// One table entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
}

/// The full catalog payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default, deserialize_with = "lenient_tables")]
    pub tables: Vec<CatalogTable>,
}

impl Catalog {
    /// True when the catalog carries no tables at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// =============================================================================
// LENIENT CONTAINER PARSING
// =============================================================================

/// Accept a sequence of tables, or degrade any other JSON shape (null,
/// object, scalar) to an empty list. Errors inside a genuine array still
/// propagate.
fn lenient_tables<'de, D>(deserializer: D) -> Result<Vec<CatalogTable>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientTables;

    impl<'de> Visitor<'de> for LenientTables {
        type Value = Vec<CatalogTable>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of catalog tables")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut tables = Vec::new();
            while let Some(table) = seq.next_element::<CatalogTable>()? {
                tables.push(table);
            }
            Ok(tables)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(LenientTables)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_catalog() {
        let json = r#"{"tables":[{"name":"payment","columns":[{"name":"id","type":"INTEGER","pk":true}]}]}"#;
        let catalog: Catalog = serde_json::from_str(json).expect("parse");
        assert_eq!(catalog.tables.len(), 1);
        assert_eq!(catalog.tables[0].name, "payment");
        assert!(catalog.tables[0].columns[0].pk);
    }

    #[test]
    fn missing_tables_field_is_empty_catalog() {
        let catalog: Catalog = serde_json::from_str("{}").expect("parse");
        assert!(catalog.is_empty());
    }

    #[test]
    fn non_array_tables_degrade_to_empty() {
        for json in [
            r#"{"tables": null}"#,
            r#"{"tables": "nope"}"#,
            r#"{"tables": 7}"#,
            r#"{"tables": {"name": "payment"}}"#,
            r#"{"tables": true}"#,
        ] {
            let catalog: Catalog = serde_json::from_str(json).expect("parse");
            assert!(catalog.is_empty(), "{json} should parse as empty");
        }
    }

    #[test]
    fn malformed_element_is_an_error() {
        // A genuine array whose entry lacks a name is corrupt, not empty.
        let json = r#"{"tables":[{"columns":[]}]}"#;
        assert!(serde_json::from_str::<Catalog>(json).is_err());
    }

    #[test]
    fn column_defaults_applied() {
        let json = r#"{"tables":[{"name":"t","columns":[{"name":"c"}]}]}"#;
        let catalog: Catalog = serde_json::from_str(json).expect("parse");
        let col = catalog.tables[0].columns[0].clone().into_column();
        assert_eq!(col.ty, "TEXT");
        assert!(!col.pk);
        assert_eq!(col.fk, None);
    }

    #[test]
    fn table_without_columns_parses() {
        let json = r#"{"tables":[{"name":"t"}]}"#;
        let catalog: Catalog = serde_json::from_str(json).expect("parse");
        assert!(catalog.tables[0].columns.is_empty());
    }
}
