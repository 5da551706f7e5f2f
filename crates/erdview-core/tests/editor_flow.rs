//! # Editor Flow Tests
//!
//! End-to-end scenarios over the editor session: mode gating, modal
//! sub-flows, catalog sync, and persistence interplay.

use erdview_core::{
    Catalog, CatalogTable, ConnectionRequest, Diagram, DisplaySize, EditorSession, Modal, Mode,
    NodeChange, NodeId, Position, Reconciler, SyncStatus, diagram_from_bytes, diagram_to_bytes,
    render_view,
};

// =============================================================================
// MODE GATING
// =============================================================================

mod mode_gating {
    use super::*;

    /// Browse mode rejects every structural gesture while leaving hover
    /// interaction live.
    #[test]
    fn browse_is_read_only() {
        let mut session = EditorSession::new();
        let before = session.diagram().clone();

        assert!(!session.apply_node_changes(&[NodeChange::Position {
            id: NodeId::new("loan"),
            position: Position::new(1.0, 2.0),
        }]));
        assert!(!session.connect(&ConnectionRequest {
            source: NodeId::new("loan"),
            target: NodeId::new("credit_score"),
            source_handle: None,
            target_handle: None,
        }));
        session.select_node(&NodeId::new("loan"));
        assert!(!session.delete_selection());
        assert!(!session.open_add_table());

        assert_eq!(session.diagram(), &before);

        session.hover(Some(NodeId::new("customer")));
        assert!(session.connected_ids().is_some());
    }

    /// Toggling back to Browse mid-edit abandons the open modal.
    #[test]
    fn leaving_edit_mode_closes_forms() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        session.open_add_table();

        session.set_mode(Mode::Browse);
        assert!(session.modal().is_none());

        // And the session is read-only again.
        session.select_node(&NodeId::new("loan"));
        assert!(!session.delete_selection());
    }

    /// Toggling modes never touches the diagram itself.
    #[test]
    fn mode_toggle_does_not_commit() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        session.set_mode(Mode::Browse);
        session.set_mode(Mode::Edit);
        assert_eq!(session.revision(), 0);
    }
}

// =============================================================================
// MODAL SUB-FLOWS
// =============================================================================

mod modal_flows {
    use super::*;

    fn edit_session() -> EditorSession {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        session
    }

    /// Only one modal open at a time; opening clears node selection.
    #[test]
    fn modal_exclusivity() {
        let mut session = edit_session();
        session.select_node(&NodeId::new("loan"));

        session.open_edit_table(&NodeId::new("customer"));
        assert!(session.selected_nodes().is_empty());
        assert!(matches!(session.modal(), Some(Modal::EditTable { .. })));

        session.open_add_table();
        assert!(matches!(session.modal(), Some(Modal::AddTable(_))));
    }

    /// A full add-table pass: form fill, column editing, submit, placement.
    #[test]
    fn add_table_end_to_end() {
        let mut session = edit_session();
        let node_count = session.diagram().node_count();

        session.open_add_table();
        {
            let form = session.form_mut().expect("form");
            form.id = "payment".to_string();
            form.table_name = "Payment".to_string();
            form.add_column();
            form.columns[0].name = "id".to_string();
            form.columns[0].ty = "bigint".to_string();
            form.columns[0].pk = true;
            form.columns[1].name = "amount".to_string();
            form.columns[1].ty = "numeric(18,2)".to_string();
        }
        assert!(session.submit_add_table());
        assert!(session.modal().is_none());

        assert_eq!(session.diagram().node_count(), node_count + 1);
        let node = session
            .diagram()
            .node(&NodeId::new("payment"))
            .expect("payment");
        assert_eq!(node.data.columns.len(), 2);
        assert!(!node.data.sample_rows.is_empty());
    }

    /// Removing all column rows still yields a persistable table.
    #[test]
    fn zero_columns_never_persisted() {
        let mut session = edit_session();
        session.open_add_table();
        {
            let form = session.form_mut().expect("form");
            form.id = "empty".to_string();
            form.table_name = "Empty".to_string();
            form.remove_column(0);
            assert!(form.columns.is_empty());
        }
        assert!(session.submit_add_table());

        let node = session.diagram().node(&NodeId::new("empty")).expect("node");
        assert_eq!(node.data.columns.len(), 1);
        assert!(node.data.columns[0].pk);
    }

    /// Blank submissions leave the form open and the store untouched; a
    /// corrected resubmit then succeeds.
    #[test]
    fn rejected_submit_is_recoverable() {
        let mut session = edit_session();
        session.open_add_table();
        session.form_mut().expect("form").table_name = "Payment".to_string();

        assert!(!session.submit_add_table());
        assert!(session.modal().is_some());

        session.form_mut().expect("form").id = "payment".to_string();
        assert!(session.submit_add_table());
        assert!(session.modal().is_none());
    }

    /// The edit flow cannot move or re-identify a node.
    #[test]
    fn edit_table_identity_is_immutable() {
        let mut session = edit_session();
        let before = session
            .diagram()
            .node(&NodeId::new("loan"))
            .expect("loan")
            .clone();

        session.open_edit_table(&NodeId::new("loan"));
        {
            let form = session.form_mut().expect("form");
            // The id field is inert in the edit flow.
            form.id = "hijacked".to_string();
            form.table_name = "Lending".to_string();
        }
        assert!(session.submit_edit_table());

        assert!(session.diagram().contains_node(&NodeId::new("loan")));
        assert!(!session.diagram().contains_node(&NodeId::new("hijacked")));
        let after = session.diagram().node(&NodeId::new("loan")).expect("loan");
        assert_eq!(after.position, before.position);
        assert_eq!(after.data.table_name, "Lending");
    }
}

// =============================================================================
// DELETION & DANGLING EDGES
// =============================================================================

mod deletion {
    use super::*;

    /// Deleting a node preserves every edge that referenced it, and the view
    /// layer hides exactly those edges.
    #[test]
    fn dangling_edges_survive_in_store_but_not_in_view() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        let edge_count = session.diagram().edge_count();

        session.select_node(&NodeId::new("customer"));
        assert!(session.delete_selection());

        assert_eq!(session.diagram().edge_count(), edge_count);
        assert!(render_view(&session).edges.is_empty());
    }

    /// A dangling edge can still be deleted explicitly afterwards.
    #[test]
    fn dangling_edge_deletable() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);

        session.select_node(&NodeId::new("customer"));
        session.delete_selection();

        let dangling = session.diagram().edges()[0].id.clone();
        session.select_edge(&dangling);
        assert!(session.delete_selection());
        assert!(!session.diagram().contains_edge(&dangling));
    }
}

// =============================================================================
// CATALOG SYNC
// =============================================================================

mod catalog_sync {
    use super::*;

    fn payment_catalog() -> Vec<CatalogTable> {
        let json = r#"{"tables":[{"name":"payment","columns":[{"name":"id","type":"INTEGER","pk":true}]}]}"#;
        serde_json::from_str::<Catalog>(json).expect("parse").tables
    }

    /// The full loop: trigger, fetch resolves, reconcile lands, status ok.
    #[test]
    fn successful_sync_round() {
        let mut session = EditorSession::with_diagram(Diagram::new());
        assert!(session.begin_sync());
        assert!(session.finish_sync(Ok(payment_catalog())));

        assert_eq!(session.sync().status, SyncStatus::Ok);
        assert_eq!(session.diagram().node_count(), 1);
        let node = session
            .diagram()
            .node(&NodeId::new("payment"))
            .expect("payment");
        assert_eq!(node.data.columns.len(), 1);
    }

    /// Re-running the identical catalog is structurally silent.
    #[test]
    fn identical_catalog_is_idempotent() {
        let mut session = EditorSession::with_diagram(Diagram::new());
        session.begin_sync();
        session.finish_sync(Ok(payment_catalog()));
        let after_first = session.diagram().clone();
        let revision = session.revision();

        session.begin_sync();
        let committed = session.finish_sync(Ok(payment_catalog()));

        assert!(!committed);
        assert_eq!(session.diagram(), &after_first);
        assert_eq!(session.revision(), revision);
        assert_eq!(session.sync().status, SyncStatus::Ok);
    }

    /// User edits survive a sync: moved positions and manual tables stay.
    #[test]
    fn sync_preserves_user_edits() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        session.apply_node_changes(&[NodeChange::Position {
            id: NodeId::new("loan"),
            position: Position::new(777.0, 888.0),
        }]);

        session.begin_sync();
        session.finish_sync(Ok(payment_catalog()));

        let loan = session.diagram().node(&NodeId::new("loan")).expect("loan");
        assert_eq!(loan.position, Position::new(777.0, 888.0));
        assert!(session.diagram().contains_node(&NodeId::new("payment")));
    }

    /// Failure path: status error with a message, diagram untouched, guard
    /// released for a retry.
    #[test]
    fn failed_sync_recovers() {
        let mut session = EditorSession::new();
        let before = session.diagram().clone();

        session.begin_sync();
        session.finish_sync(Err(
            "Could not reach the catalog API at http://localhost:8765. \
             Check that it is running and try again."
                .to_string(),
        ));

        assert_eq!(session.sync().status, SyncStatus::Error);
        assert!(session.sync().message.contains("catalog API"));
        assert_eq!(session.diagram(), &before);

        assert!(session.begin_sync());
    }
}

// =============================================================================
// PERSISTENCE INTERPLAY
// =============================================================================

mod persistence {
    use super::*;

    /// An edited session survives a serialize/deserialize cycle with all
    /// structural state intact and all transient state dropped.
    #[test]
    fn edited_state_survives_reload() {
        let mut session = EditorSession::new();
        session.set_mode(Mode::Edit);
        session.hover(Some(NodeId::new("customer")));
        session.connect(&ConnectionRequest {
            source: NodeId::new("loan"),
            target: NodeId::new("credit_score"),
            source_handle: Some("balance".to_string()),
            target_handle: Some("score".to_string()),
        });

        let bytes = diagram_to_bytes(session.diagram()).expect("serialize");
        let reloaded = EditorSession::with_diagram(diagram_from_bytes(&bytes).expect("parse"));

        assert_eq!(reloaded.diagram(), session.diagram());
        // Transient state resets on reload.
        assert_eq!(reloaded.mode(), Mode::Browse);
        assert!(reloaded.hovered().is_none());
        assert_eq!(reloaded.sync().status, SyncStatus::Idle);
    }

    /// A reconciled diagram roundtrips including catalog-synthesized nodes.
    #[test]
    fn reconciled_state_survives_reload() {
        let tables = vec![CatalogTable {
            name: "payment".to_string(),
            columns: Vec::new(),
        }];
        let (diagram, _) = Reconciler::reconcile(&Diagram::new(), &tables);

        let bytes = diagram_to_bytes(&diagram).expect("serialize");
        let restored = diagram_from_bytes(&bytes).expect("parse");
        assert_eq!(restored, diagram);
    }

    /// Display size is not part of the diagram snapshot.
    #[test]
    fn display_size_is_independent_of_snapshot() {
        let mut session = EditorSession::new();
        session.set_display_size(DisplaySize::Large);

        let bytes = diagram_to_bytes(session.diagram()).expect("serialize");
        let reloaded = EditorSession::with_diagram(diagram_from_bytes(&bytes).expect("parse"));
        assert_eq!(reloaded.display_size(), DisplaySize::Medium);
    }
}
