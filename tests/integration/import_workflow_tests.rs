/*!
 * End-to-end import runs against database files on disk
 */

use std::collections::HashSet;

use locimport::app_config::{Config, RecoverableKind};
use locimport::database::{repository, DatabaseConnection};
use locimport::errors::ImportError;
use locimport::importer::{run_import, ImportOptions, ImportState, Importer};

use crate::common;

fn config_for(dir: &std::path::Path, lines: &[&str]) -> Config {
    Config {
        database_path: common::create_test_database(dir).unwrap(),
        input_path: common::create_test_csv(dir, lines).unwrap(),
        ..Config::default()
    }
}

#[test]
fn test_runImport_withSampleFile_shouldMatchExpectedRows() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(dir.path(), &["fire;;;water;Feuer und Wasser;Fire and Water"]);

    let summary = run_import(&config).unwrap();
    assert!(summary.committed);

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    let attributes = repository::list_attributes(db.connection()).unwrap();
    let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["fire", "water"]);

    let records = repository::list_localizations(db.connection()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].attributes,
        [Some(attributes[0].id), None, None, Some(attributes[1].id)]
    );
    assert_eq!(records[0].text_de, "Feuer und Wasser");
    assert_eq!(records[0].text_en, "Fire and Water");
}

#[test]
fn test_runImport_withRepeatedNames_shouldCreateOneAttributePerDistinctName() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let lines = [
        "fire;ice;;;Feuer Eis;Fire Ice",
        " fire ;water;;;Feuer Wasser;Fire Water",
        "ice;fire;water;earth;Alles;Everything",
        "earth;;;;Erde;Earth",
    ];
    let config = config_for(dir.path(), &lines);

    let summary = run_import(&config).unwrap();

    let distinct: HashSet<&str> = lines
        .iter()
        .flat_map(|line| line.split(';').take(4))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    assert_eq!(
        repository::count_rows(db.connection(), "attribute").unwrap() as usize,
        distinct.len()
    );
    assert_eq!(summary.attributes_created, distinct.len());
    assert_eq!(summary.inserted, 4);
}

#[test]
fn test_runImport_twice_shouldReuseExistingAttributes() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(dir.path(), &["fire;;;;Feuer;Fire"]);

    run_import(&config).unwrap();
    let first_id = {
        let db = DatabaseConnection::open(&config.database_path, false).unwrap();
        repository::find_attribute_id(db.connection(), "fire").unwrap()
    };

    common::create_test_csv(dir.path(), &["fire;water;;;Feuer Wasser;Fire Water"]).unwrap();
    let summary = run_import(&config).unwrap();

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    assert_eq!(
        repository::find_attribute_id(db.connection(), "fire").unwrap(),
        first_id
    );
    assert_eq!(summary.attributes_created, 1);
    assert_eq!(repository::count_rows(db.connection(), "attribute").unwrap(), 2);
}

#[test]
fn test_runImport_withMalformedRows_shouldSkipThemAndContinue() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(
        dir.path(),
        &[
            "short;a;b;c;only five",
            "long;a;b;c;d;e;seven",
            "valid;;;;Gültig;Valid",
        ],
    );

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.skipped_malformed, 2);
    assert_eq!(summary.inserted, 1);

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    let names: Vec<_> = repository::list_attributes(db.connection())
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["valid".to_string()]);
    assert_eq!(repository::count_rows(db.connection(), "localization").unwrap(), 1);
}

#[test]
fn test_runImport_withDuplicateRow_shouldSkipItAndKeepLaterRows() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(
        dir.path(),
        &[
            "a;b;c;d;Erste;First",
            "a;b;c;d;Doppelt;Duplicate",
            "e;f;g;h;Dritte;Third",
        ],
    );

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped_rejected, 1);

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    let texts: Vec<_> = repository::list_localizations(db.connection())
        .unwrap()
        .into_iter()
        .map(|r| r.text_en)
        .collect();
    assert_eq!(texts, vec!["First".to_string(), "Third".to_string()]);
}

#[test]
fn test_runImport_withBlankLine_shouldCountItAsMalformed() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(dir.path(), &["a;;;;x;y", "", "b;;;;x2;y2"]);

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.skipped_malformed, 1);
    assert_eq!(summary.inserted, 2);
}

#[test]
fn test_runImport_withLeadingBlankLine_shouldImportHeaderRowAsData() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = Config {
        database_path: common::create_test_database(dir.path()).unwrap(),
        input_path: common::create_test_file(
            dir.path(),
            "local_data_input.csv",
            "\nheader;ignored;ignored;ignored;ignored;ignored\nfire;;;water;D;E\n",
        )
        .unwrap(),
        ..Config::default()
    };

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.rows_read, 2);
    assert_eq!(summary.inserted, 2);

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    let names: HashSet<_> = repository::list_attributes(db.connection())
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert!(names.contains("header"));
    assert!(names.contains("fire"));
}

#[test]
fn test_importFile_withEmptyRecoverablePolicy_shouldAbortOnDuplicate() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = config_for(
        dir.path(),
        &["a;b;c;d;Erste;First", "a;b;c;d;Doppelt;Duplicate"],
    );
    let options = ImportOptions {
        recoverable_errors: Vec::<RecoverableKind>::new(),
        ..ImportOptions::from(&config)
    };

    let mut db = DatabaseConnection::open(&config.database_path, false).unwrap();
    let mut importer = Importer::new(db.connection_mut(), options);
    let result = importer.import_file(&config.input_path);

    assert!(matches!(result, Err(ImportError::FatalDatabase(_))));
    assert_eq!(importer.state(), ImportState::Aborted);

    // Nothing from the aborted run was committed
    assert_eq!(repository::count_rows(db.connection(), "attribute").unwrap(), 0);
    assert_eq!(repository::count_rows(db.connection(), "localization").unwrap(), 0);
}

#[test]
fn test_runImport_withMissingInput_shouldNotTouchDatabase() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = Config {
        database_path: dir.path().join("never_created.db"),
        input_path: dir.path().join("missing.csv"),
        init_schema: true,
        ..Config::default()
    };

    let result = run_import(&config);

    match result {
        Err(e @ ImportError::MissingInput { .. }) => assert!(e.to_string().contains("not found")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!config.database_path.exists());
}

#[test]
fn test_runImport_withoutTables_shouldFailSchemaCheck() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let database_path = dir.path().join("empty.db");
    rusqlite::Connection::open(&database_path)
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (x INTEGER);")
        .unwrap();
    let config = Config {
        database_path,
        input_path: common::create_test_csv(dir.path(), &["a;;;;x;y"]).unwrap(),
        ..Config::default()
    };

    assert!(matches!(run_import(&config), Err(ImportError::Schema(_))));
}

#[test]
fn test_runImport_withInitSchema_shouldBootstrapNewDatabase() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let config = Config {
        database_path: dir.path().join("fresh.db"),
        input_path: common::create_test_csv(dir.path(), &["a;;;;x;y"]).unwrap(),
        init_schema: true,
        ..Config::default()
    };

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.inserted, 1);
    assert!(config.database_path.exists());
}

#[test]
fn test_runImport_withDryRun_shouldReportButNotPersist() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let mut config = config_for(dir.path(), &["a;;;;x;y", "b;;;;x;y"]);
    config.dry_run = true;

    let summary = run_import(&config).unwrap();

    assert_eq!(summary.inserted, 2);
    assert!(!summary.committed);
    assert!(summary.to_string().contains("not committed"));

    let db = DatabaseConnection::open(&config.database_path, false).unwrap();
    assert_eq!(repository::count_rows(db.connection(), "localization").unwrap(), 0);
}
