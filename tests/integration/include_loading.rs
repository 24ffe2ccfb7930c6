//! Loading documents from volumes: load, load_file, initialize, includes

use super::test_utils::{test_identity, volume_dir, write_volume_file};
use conftree::{DirVolume, MemoryVolume, Store, StoreSettings};

fn dir_store(root: &std::path::Path) -> Store {
    Store::with_volume(DirVolume::new(root).unwrap()).with_identity(test_identity())
}

#[test]
fn test_top_level_include_loads_nested_document() {
    let temp_dir = volume_dir(&[
        (
            "conftree\\conftree.xml",
            "<configuration>\
               <include>conftree\\memory.xml</include>\
               <Board>main</Board>\
             </configuration>",
        ),
        (
            "conftree\\memory.xml",
            "<configuration>\
               <Memory><Count><unsigned>2</unsigned></Count></Memory>\
             </configuration>",
        ),
    ]);

    let mut store = dir_store(temp_dir.path());
    store.load("conftree\\conftree.xml").unwrap();

    assert_eq!(store.get_unsigned("\\Memory\\Count").unwrap(), 2);
    assert_eq!(store.get_string("\\Board").unwrap(), "main");
    assert!(store.get_type("\\include").unwrap_err().is_not_found());
}

#[test]
fn test_failed_include_does_not_abort_load() {
    let temp_dir = volume_dir(&[
        (
            "main.xml",
            "<configuration>\
               <include>absent.xml</include>\
               <include>broken.xml</include>\
               <After><true/></After>\
             </configuration>",
        ),
        ("broken.xml", "<configuration><Open></configuration>"),
    ]);

    let mut store = dir_store(temp_dir.path());
    store.load("main.xml").unwrap();
    assert!(store.get_boolean("\\After").unwrap());
}

#[test]
fn test_include_cycle_terminates() {
    let volume = MemoryVolume::new();
    volume.insert(
        "a.xml",
        "<configuration><include>b.xml</include><FromA><true/></FromA></configuration>",
    );
    volume.insert(
        "b.xml",
        "<configuration><include>a.xml</include><FromB><true/></FromB></configuration>",
    );

    let mut store = Store::with_volume(volume).with_identity(test_identity());
    store.load("a.xml").unwrap();
    assert!(store.get_boolean("\\FromA").unwrap());
    assert!(store.get_boolean("\\FromB").unwrap());
}

#[test]
fn test_empty_file_is_not_found() {
    let temp_dir = volume_dir(&[("empty.xml", "")]);
    let mut store = dir_store(temp_dir.path());
    assert!(store.load("empty.xml").unwrap_err().is_not_found());
    assert!(store.load("missing.xml").unwrap_err().is_not_found());
}

#[test]
fn test_load_file_from_host_path() {
    let temp_dir = volume_dir(&[(
        "standalone.xml",
        "<configuration><Standalone><unsigned>1</unsigned></Standalone></configuration>",
    )]);

    let mut store = Store::new().with_identity(test_identity());
    store
        .load_file(temp_dir.path().join("standalone.xml"))
        .unwrap();
    assert_eq!(store.get_unsigned("\\Standalone").unwrap(), 1);
}

#[test]
fn test_initialize_prefers_main_document() {
    let temp_dir = volume_dir(&[
        (
            "conftree\\conftree.xml",
            "<configuration><Source>main</Source></configuration>",
        ),
        (
            "conftree\\X64\\conftree.xml",
            "<configuration><Source>arch</Source></configuration>",
        ),
    ]);

    let mut settings = StoreSettings::default();
    settings.platform = test_identity();
    settings.loader.root = Some(temp_dir.path().to_path_buf());

    let mut store = Store::from_settings(settings).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.get_string("\\Source").unwrap(), "main");
}

#[test]
fn test_initialize_falls_back_when_main_is_invalid() {
    let temp_dir = volume_dir(&[
        ("conftree\\conftree.xml", "<configuration><Broken>"),
        (
            "conftree\\X64\\conftree.xml",
            "<configuration><Source>arch</Source></configuration>",
        ),
    ]);

    let mut settings = StoreSettings::default();
    settings.platform = test_identity();
    settings.loader.root = Some(temp_dir.path().to_path_buf());

    let mut store = Store::from_settings(settings).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.get_string("\\Source").unwrap(), "arch");
}

#[test]
fn test_utf16_file_on_disk() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut bytes = Vec::new();
    for unit in "<configuration><Wide><true/></Wide></configuration>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    write_volume_file(temp_dir.path(), "conftree\\conftree.xml", &bytes);

    let mut store = dir_store(temp_dir.path());
    store.initialize().unwrap();
    assert!(store.get_boolean("\\Wide").unwrap());
}
