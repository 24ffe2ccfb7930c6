//! Document ingestion through the public store API

use super::test_utils::{test_identity, test_store};
use conftree::{PlatformIdentity, Store, StoreError, Value, ValueKind};

const BOARD_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <Board>
    <Name>Contoso Rack 7</Name>
    <Revision><unsigned>0x0C</unsigned></Revision>
    <Offset><integer>-12</integer></Offset>
    <SecureBoot><true/></SecureBoot>
    <Legacy><boolean>0</boolean></Legacy>
    <Key><data>3q2+7w==</data></Key>
  </Board>
  <Count><integer>42</integer></Count>
  <Flag><true/></Flag>
  <Other arch="other"><Bits><unsigned>16</unsigned></Bits></Other>
  <Native arch="x64"><Bits><unsigned>64</unsigned></Bits></Native>
  <Vendor manufacturer="contoso"><Tuned><true/></Tuned></Vendor>
  <Competitor manufacturer="fabrikam"><Tuned><true/></Tuned></Competitor>
  <Model product="RACK 7"><Fans><unsigned>6</unsigned></Fans></Model>
</configuration>
"#;

fn loaded(xml: &str) -> Store {
    let mut store = test_store();
    store.parse_bytes(xml.as_bytes()).unwrap();
    store
}

#[test]
fn test_scalar_literals_are_typed() {
    let store = loaded(BOARD_XML);
    assert_eq!(store.get_integer("\\Count").unwrap(), 42);
    assert!(store.get_boolean("\\Flag").unwrap());
    assert_eq!(store.get_string("\\Board\\Name").unwrap(), "Contoso Rack 7");
    assert_eq!(store.get_unsigned("\\Board\\Revision").unwrap(), 12);
    assert_eq!(store.get_integer("\\Board\\Offset").unwrap(), -12);
    assert!(store.get_boolean("\\Board\\SecureBoot").unwrap());
    assert!(!store.get_boolean("\\Board\\Legacy").unwrap());
    assert_eq!(
        store.get_data("\\Board\\Key").unwrap(),
        vec![0xde, 0xad, 0xbe, 0xef]
    );
}

#[test]
fn test_platform_filtering() {
    let store = loaded(BOARD_XML);
    assert!(store.get_type("\\Other").unwrap_err().is_not_found());
    assert_eq!(store.get_unsigned("\\Native\\Bits").unwrap(), 64);
    assert!(store.get_boolean("\\Vendor\\Tuned").unwrap());
    assert!(store.get_type("\\Competitor").unwrap_err().is_not_found());
    assert_eq!(store.get_unsigned("\\Model\\Fans").unwrap(), 6);
}

#[test]
fn test_other_platform_sees_other_elements() {
    let mut store =
        Store::new().with_identity(PlatformIdentity::new("other", "Fabrikam", "Tower"));
    store.parse_bytes(BOARD_XML.as_bytes()).unwrap();
    assert_eq!(store.get_unsigned("\\Other\\Bits").unwrap(), 16);
    assert!(store.get_type("\\Native").is_err());
    assert!(store.get_type("\\Vendor").is_err());
    assert!(store.get_boolean("\\Competitor\\Tuned").unwrap());
    assert!(store.get_type("\\Model").is_err());
}

#[test]
fn test_group_and_auto_group_indexing() {
    let store = loaded(
        r#"<configuration>
             <Memory>
               <Slot>
                 <Size><unsigned>8192</unsigned></Size>
                 <group><Size><unsigned>16384</unsigned></Size></group>
                 <group><Size><unsigned>0</unsigned></Size></group>
               </Slot>
             </Memory>
             <Fans>
               <group><Rpm><unsigned>1200</unsigned></Rpm></group>
               <group><Rpm><unsigned>1300</unsigned></Rpm></group>
             </Fans>
           </configuration>"#,
    );

    assert_eq!(
        store.list_children(Some("\\Memory\\Slot")).unwrap(),
        vec!["0", "1", "2"]
    );
    assert_eq!(store.get_unsigned("\\Memory\\Slot\\0\\Size").unwrap(), 8192);
    assert_eq!(store.get_unsigned("\\Memory\\Slot\\1\\Size").unwrap(), 16384);
    assert_eq!(store.get_unsigned("\\Memory\\Slot\\2\\Size").unwrap(), 0);

    assert_eq!(store.list_children(Some("\\Fans")).unwrap(), vec!["0", "1"]);
    assert_eq!(store.get_unsigned("\\Fans\\1\\Rpm").unwrap(), 1300);
}

#[test]
fn test_utf16_document() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<configuration><Wide><unsigned>16</unsigned></Wide></configuration>"
        .encode_utf16()
    {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let mut store = test_store();
    store.parse_bytes(&bytes).unwrap();
    assert_eq!(store.get_unsigned("\\Wide").unwrap(), 16);
}

#[test]
fn test_malformed_documents() {
    let mut store = test_store();
    assert!(matches!(
        store.parse_bytes(b"<configuration><A></configuration>"),
        Err(StoreError::Xml(_))
    ));
    assert!(store
        .parse_bytes(b"<settings><A>1</A></settings>")
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        store.parse_bytes(b""),
        Err(StoreError::InvalidArgument(_))
    ));
    assert!(store.local_tree().is_empty());
}

#[test]
fn test_second_document_merges_and_overrides() {
    let mut store = loaded("<configuration><A><integer>1</integer></A><B>keep</B></configuration>");
    store
        .parse_bytes(b"<configuration><A><unsigned>2</unsigned></A><C>new</C></configuration>")
        .unwrap();
    assert_eq!(
        store.get_value("\\A").unwrap(),
        (ValueKind::Unsigned, Some(Value::Unsigned(2)))
    );
    assert_eq!(store.get_string("\\B").unwrap(), "keep");
    assert_eq!(store.get_string("\\C").unwrap(), "new");
}

#[test]
fn test_deep_nesting_is_rejected() {
    let mut settings = conftree::StoreSettings::default();
    settings.platform = test_identity();
    settings.ingest.max_depth = 8;
    let mut store = Store::from_settings(settings).unwrap();

    let mut xml = String::from("<configuration>");
    for _ in 0..10 {
        xml.push_str("<Level>");
    }
    xml.push_str("bottom");
    for _ in 0..10 {
        xml.push_str("</Level>");
    }
    xml.push_str("</configuration>");

    assert!(matches!(
        store.parse_bytes(xml.as_bytes()),
        Err(StoreError::DepthExceeded { limit: 8, .. })
    ));
}
