//! # Built-in Default Diagram
//!
//! The diagram shown on first run and restored by the reset action: the core
//! CRM tables and their foreign-key relationships. Purely illustrative data;
//! the catalog sync overlays real column lists on top of it.

use crate::graph::Diagram;
use crate::types::{
    Column, Edge, EdgeId, Node, NodeId, Position, SampleRow, TableData, TableGroup,
};

fn row(pairs: &[(&str, &str)]) -> SampleRow {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn table(
    id: &str,
    name: &str,
    group: TableGroup,
    position: Position,
    columns: Vec<Column>,
    sample: SampleRow,
) -> Node {
    Node::new(
        NodeId::new(id),
        position,
        TableData {
            table_name: name.to_string(),
            group,
            columns,
            sample_rows: vec![sample],
        },
    )
}

fn relation(id: &str, source: &str, target: &str, label: &str) -> Edge {
    Edge {
        id: EdgeId::new(id),
        source: NodeId::new(source),
        target: NodeId::new(target),
        source_handle: Some("source".to_string()),
        target_handle: Some("target".to_string()),
        label: label.to_string(),
    }
}

/// The built-in default diagram.
///
/// Constructed through the same validated entry points as user edits, so the
/// defaults can never violate the store's id-uniqueness invariants.
#[must_use]
pub fn default_diagram() -> Diagram {
    let nodes = vec![
        table(
            "customer",
            "Customer",
            TableGroup::Basic,
            Position::new(80.0, 160.0),
            vec![
                Column::primary_key("id", "bigint"),
                Column::new("name", "varchar(100)"),
                Column::new("birth_date", "date"),
                Column::new("phone", "varchar(20)"),
                Column::new("grade", "varchar(10)"),
            ],
            row(&[("id", "1"), ("name", "Kim Jiwon"), ("grade", "VIP")]),
        ),
        table(
            "loan",
            "Loan",
            TableGroup::Financial,
            Position::new(460.0, 40.0),
            vec![
                Column::primary_key("id", "bigint"),
                Column::foreign_key("customer_id", "bigint", "customer.id"),
                Column::new("product", "varchar(100)"),
                Column::new("principal", "numeric(18,2)"),
                Column::new("balance", "numeric(18,2)"),
            ],
            row(&[("id", "1"), ("customer_id", "1"), ("balance", "24000000")]),
        ),
        table(
            "credit_score",
            "Credit Score",
            TableGroup::Financial,
            Position::new(460.0, 300.0),
            vec![
                Column::primary_key("id", "bigint"),
                Column::foreign_key("customer_id", "bigint", "customer.id"),
                Column::new("score", "int"),
                Column::new("rated_at", "date"),
            ],
            row(&[("id", "1"), ("customer_id", "1"), ("score", "812")]),
        ),
        table(
            "consultation",
            "Consultation",
            TableGroup::Basic,
            Position::new(80.0, 420.0),
            vec![
                Column::primary_key("id", "bigint"),
                Column::foreign_key("customer_id", "bigint", "customer.id"),
                Column::new("channel", "varchar(20)"),
                Column::new("memo", "text"),
                Column::new("consulted_at", "timestamp"),
            ],
            row(&[("id", "1"), ("customer_id", "1"), ("channel", "phone")]),
        ),
        table(
            "mydata_asset",
            "MyData Asset",
            TableGroup::Financial,
            Position::new(460.0, 540.0),
            vec![
                Column::primary_key("id", "bigint"),
                Column::foreign_key("customer_id", "bigint", "customer.id"),
                Column::new("institution", "varchar(100)"),
                Column::new("balance", "numeric(18,2)"),
            ],
            row(&[("id", "1"), ("customer_id", "1"), ("institution", "K-Bank")]),
        ),
    ];

    let edges = vec![
        relation("e-customer-loan", "customer", "loan", "customer.id → loan.customer_id"),
        relation(
            "e-customer-credit_score",
            "customer",
            "credit_score",
            "customer.id → credit_score.customer_id",
        ),
        relation(
            "e-customer-consultation",
            "customer",
            "consultation",
            "customer.id → consultation.customer_id",
        ),
        relation(
            "e-customer-mydata_asset",
            "customer",
            "mydata_asset",
            "customer.id → mydata_asset.customer_id",
        ),
    ];

    let mut diagram = Diagram::new();
    for node in nodes {
        if let Ok(next) = diagram.with_node(node) {
            diagram = next;
        }
    }
    for edge in edges {
        if let Ok(next) = diagram.with_edge(edge) {
            diagram = next;
        }
    }
    diagram
}

// =============================================================================
// TESTS
// =============================================================================
