use super::*;

fn record(
    title: &str,
    version: u32,
    base: BaseDirectory,
    download: &str,
    install: &str,
) -> PackageRecord {
    PackageRecord::new(title, version, base, download, install).expect("record must be valid")
}

fn sample_store() -> VersionStore {
    [
        record("Application", 4, BaseDirectory::Build, "Application.zip", ""),
        record("Images", 2, BaseDirectory::Content, "Images.zip", "Images"),
        record("Planets", 7, BaseDirectory::LocalAppData, "Planets.txt", "Planets.txt"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn parse_versioning_blob() {
    let store = VersionStore::parse(
        "Images:3:2:Images.zip:Images;Application:5:1:Application.zip:;Planets:1:3:Planets.txt:Planets.txt",
    );

    assert_eq!(store.len(), 3);
    let images = store.get("Images").expect("images must parse");
    assert_eq!(images.version(), 3);
    assert_eq!(images.base_directory(), BaseDirectory::Content);
    assert_eq!(images.download_path(), "Images.zip");
    assert_eq!(images.install_path(), "Images");
    assert_eq!(images.payload_kind(), PayloadKind::Zip);

    let application = store.get("Application").expect("application must parse");
    assert_eq!(application.install_path(), "");
    assert_eq!(application.base_directory(), BaseDirectory::Build);
}

#[test]
fn parse_empty_blob_yields_empty_store() {
    assert!(VersionStore::parse("").is_empty());
    assert!(VersionStore::parse("  \n").is_empty());
}

#[test]
fn serialize_round_trips_store() {
    let store = sample_store();
    let encoded = store.serialize();

    assert!(!encoded.ends_with(';'), "no trailing delimiter: {encoded}");
    assert_eq!(VersionStore::parse(&encoded), store);
}

#[test]
fn serialize_emits_entries_in_title_order() {
    assert_eq!(
        sample_store().to_string(),
        "Application:4:1:Application.zip:;Images:2:2:Images.zip:Images;Planets:7:3:Planets.txt:Planets.txt"
    );
}

#[test]
fn serialize_empty_store_is_empty_text() {
    assert_eq!(VersionStore::new().serialize(), "");
}

#[test]
fn parse_skips_entries_with_missing_fields() {
    let (store, errors) =
        VersionStore::parse_with_errors("Images:3:2:Images.zip:Images;Fonts:2:2:Fonts.zip");

    assert_eq!(store.len(), 1);
    assert!(store.contains("Images"));
    assert!(!store.contains("Fonts"));
    assert!(errors.is_empty(), "short entries are dropped silently");
}

#[test]
fn parse_tolerates_trailing_delimiter_and_newline() {
    let store = VersionStore::parse("Images:3:2:Images.zip:Images;\n");
    assert_eq!(store.len(), 1);
}

#[test]
fn parse_isolates_malformed_numeric_fields() {
    let (store, errors) = VersionStore::parse_with_errors(
        "Images:three:2:Images.zip:Images;Fonts:2:x:Fonts.zip:Fonts;Music:-1:2:Music.zip:Music;Atlas:1:2:Atlas.zip:Atlas",
    );

    assert_eq!(store.titles().collect::<Vec<_>>(), vec!["Atlas"]);
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .all(|err| matches!(err, RecordError::MalformedRecord { .. })));
    assert!(
        errors[0].to_string().contains("Images:three"),
        "unexpected error: {}",
        errors[0]
    );
}

#[test]
fn parse_ignores_fields_past_the_fifth() {
    let store = VersionStore::parse("Images:3:2:Images.zip:Images:extra");
    let images = store.get("Images").expect("images must parse");
    assert_eq!(images.install_path(), "Images");
}

#[test]
fn parse_keeps_higher_counter_for_duplicate_titles() {
    let store = VersionStore::parse("Images:3:2:Images.zip:Images;Images:1:2:Old.zip:Images");
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("Images").map(PackageRecord::version), Some(3));
}

#[test]
fn parse_preserves_unrecognized_base_directory() {
    let store = VersionStore::parse("Mods:1:9:Mods.zip:Mods");
    let mods = store.get("Mods").expect("mods must parse");
    assert_eq!(mods.base_directory(), BaseDirectory::Unrecognized(9));
    assert!(!mods.base_directory().is_recognized());
    assert_eq!(store.serialize(), "Mods:1:9:Mods.zip:Mods");
}

#[test]
fn merge_inserts_missing_title() {
    let mut store = VersionStore::new();
    let outcome = store.merge(record("Fonts", 1, BaseDirectory::Content, "Fonts.zip", "Fonts"));
    assert_eq!(outcome, MergeOutcome::Inserted);
    assert!(store.contains("Fonts"));
}

#[test]
fn merge_replaces_only_strictly_newer_counter() {
    let mut store = sample_store();

    let equal = record("Images", 2, BaseDirectory::Content, "Other.zip", "Other");
    assert_eq!(store.merge(equal), MergeOutcome::Unchanged);
    assert_eq!(
        store.get("Images").map(PackageRecord::download_path),
        Some("Images.zip")
    );

    let older = record("Images", 1, BaseDirectory::Content, "Old.zip", "Images");
    assert_eq!(store.merge(older), MergeOutcome::Unchanged);
    assert_eq!(store.get("Images").map(PackageRecord::version), Some(2));

    let newer = record("Images", 3, BaseDirectory::Content, "Images-v3.zip", "Images");
    assert_eq!(store.merge(newer.clone()), MergeOutcome::Replaced);
    assert_eq!(store.get("Images"), Some(&newer));
}

#[test]
fn record_rejects_delimiters_in_fields() {
    let err = PackageRecord::new("Ima:ges", 1, BaseDirectory::Content, "Images.zip", "")
        .expect_err("colon in title must be rejected");
    assert!(matches!(err, RecordError::InvalidField { field: "title", .. }));

    let err = PackageRecord::new("Images", 1, BaseDirectory::Content, "a;b.zip", "")
        .expect_err("semicolon in download path must be rejected");
    assert!(matches!(
        err,
        RecordError::InvalidField {
            field: "download path",
            ..
        }
    ));
}

#[test]
fn record_rejects_whitespace_edged_fields() {
    let err = PackageRecord::new(" Images", 2, BaseDirectory::Content, "Images.zip", "Images")
        .expect_err("leading space in title must be rejected");
    assert!(matches!(err, RecordError::InvalidField { field: "title", .. }));

    let err = PackageRecord::new("Images", 2, BaseDirectory::Content, "Images.zip", "Images ")
        .expect_err("trailing space in install path must be rejected");
    assert!(matches!(
        err,
        RecordError::InvalidField {
            field: "install path",
            ..
        }
    ));
    assert!(err.to_string().contains("whitespace"), "unexpected error: {err}");

    let err = PackageRecord::new("Images", 2, BaseDirectory::Content, "Images.zip\n", "Images")
        .expect_err("trailing newline in download path must be rejected");
    assert!(matches!(
        err,
        RecordError::InvalidField {
            field: "download path",
            ..
        }
    ));
}

#[test]
fn record_keeps_interior_whitespace_through_round_trip() {
    let store: VersionStore = [record(
        "Sound Pack",
        2,
        BaseDirectory::Content,
        "Sound Pack.zip",
        "Sound Pack",
    )]
    .into_iter()
    .collect();

    assert_eq!(VersionStore::parse(&store.serialize()), store);
}

#[test]
fn parse_trims_whitespace_around_fields() {
    let store = VersionStore::parse(" Images : 2 : 2 : Images.zip : Images \n");
    let images = store.get("Images").expect("images must parse");
    assert_eq!(images.download_path(), "Images.zip");
    assert_eq!(images.install_path(), "Images");
    assert_eq!(VersionStore::parse(&store.serialize()), store);
}

#[test]
fn record_rejects_empty_title() {
    let err = PackageRecord::parse_entry(":1:2:Images.zip:Images").expect_err("empty title");
    assert!(matches!(err, RecordError::MalformedRecord { .. }));
}

#[test]
fn base_directory_codes_round_trip() {
    for code in 0..=5_u8 {
        assert_eq!(BaseDirectory::from_code(code).code(), code);
    }
    assert_eq!(BaseDirectory::from_code(3), BaseDirectory::LocalAppData);
}

#[test]
fn payload_kind_is_inferred_from_extension() {
    assert_eq!(PayloadKind::infer_from_path("Music.zip"), PayloadKind::Zip);
    assert_eq!(PayloadKind::infer_from_path("packs/Music.ZIP"), PayloadKind::Zip);
    assert_eq!(PayloadKind::infer_from_path("Music.zip?sig=abc"), PayloadKind::Zip);
    assert_eq!(PayloadKind::infer_from_path("Planets.txt"), PayloadKind::File);
    assert_eq!(PayloadKind::infer_from_path("Application.exe"), PayloadKind::File);
    assert!(PayloadKind::Zip.is_archive());
    assert!(!PayloadKind::File.is_archive());
}
