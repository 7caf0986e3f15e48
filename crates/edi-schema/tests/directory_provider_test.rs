//! Integration tests for edi-schema against the shared definition files

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use edi_schema::{DataType, DirectorySchemaProvider, Error, NodeKind, SchemaProvider};

fn schemas() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("testdata")
        .join("schemas")
}

#[test]
fn test_orders_message_definition() -> Result<()> {
    let provider = DirectorySchemaProvider::new(schemas());
    let orders = provider.lookup("ORDERS", Some("D96A"), Some(4))?;

    assert_eq!(orders.kind, NodeKind::Message);
    assert_eq!(orders.name, "Purchase order message");
    assert_eq!(orders.children[0].id, "UNH");
    assert!(orders.children[0].required);

    let parties = orders
        .children
        .iter()
        .find(|child| child.id == "SG2")
        .ok_or_else(|| anyhow::anyhow!("SG2 missing from ORDERS"))?;
    assert_eq!(parties.kind, NodeKind::Group);
    assert_eq!(parties.max_repeat, 99);
    assert_eq!(parties.opening_segment_ids(), vec!["NAD"]);
    Ok(())
}

#[test]
fn test_service_and_directory_definitions() -> Result<()> {
    let provider = DirectorySchemaProvider::new(schemas());

    let unh = provider.lookup("UNH", Some("D96A"), Some(4))?;
    assert_eq!(unh.kind, NodeKind::Segment);
    assert!(unh.children.iter().any(|child| child.id == "S009"));

    let document_name = provider.lookup("1001", Some("d96a"), Some(4))?;
    assert_eq!(document_name.data_type, DataType::Alphanumeric);
    assert_eq!(document_name.max_length, Some(3));
    assert_eq!(document_name.description, "Code specifying the document or message name.");
    Ok(())
}

#[test]
fn test_code_lists() -> Result<()> {
    let provider = DirectorySchemaProvider::new(schemas());

    let codes = provider.codes_for("1001", Some("D96A"), Some(4))?;
    let order = codes.iter().find(|code| code.code == "220");
    assert_eq!(order.map(|code| code.description.as_str()), Some("Order"));

    let agencies = provider.codes_for("0051", Some("D96A"), Some(4))?;
    assert_eq!(agencies[0].description, "UN/CEFACT");

    assert!(provider.codes_for("1004", Some("D96A"), Some(4))?.is_empty());
    Ok(())
}

#[test]
fn test_lookups_are_cached() -> Result<()> {
    let provider = DirectorySchemaProvider::new(schemas());
    let first = provider.lookup("BGM", Some("D96A"), Some(4))?;
    let second = provider.lookup("BGM", Some("D96A"), Some(4))?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.registry().len(), 1);
    Ok(())
}

#[test]
fn test_unknown_message_is_not_found() {
    let provider = DirectorySchemaProvider::new(schemas());
    match provider.lookup("INVOIC", Some("D96A"), Some(4)) {
        Err(Error::NotFound(message)) => assert!(message.contains("invoic"), "{message}"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
