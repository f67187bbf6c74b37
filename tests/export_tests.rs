//! Export files written to disk

use std::fs;

use wallet_recovery_libs::{
    errors::ExportError,
    export::{
        export_all, export_to_csv, export_to_electrum, export_to_json, export_to_text,
        ExportFormat, ExportOptions, CSV_HEADER,
    },
    RecoveredKey,
};

fn keys() -> Vec<RecoveredKey> {
    let mut funded = RecoveredKey::new(
        "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH".to_string(),
        format!("{:064x}", 1),
        "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn".to_string(),
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798".to_string(),
        true,
        "main \"hot\" wallet".to_string(),
    );
    funded.balance_satoshis = 250_000_000;
    funded.tx_count = 4;
    funded.has_balance = true;

    let unused = RecoveredKey::new(
        "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm".to_string(),
        format!("{:064x}", 1),
        "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf".to_string(),
        "04".to_string(),
        false,
        String::new(),
    );

    vec![funded, unused]
}

#[test]
fn test_export_all_formats() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions::default()
        .with_output_dir(dir.path().join("nested"))
        .with_base_name("recovered");

    let outcomes = export_all(&keys(), &options);
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let text = fs::read_to_string(options.path_for(ExportFormat::Text)).unwrap();
    assert!(text.starts_with("Bitcoin Wallet Recovery Results\nGenerated: "));
    assert!(text.contains("Total Addresses: 2\n"));
    assert!(text.contains("Funded Addresses: 1/2\n"));
    assert!(text.contains("Total Balance: 2.50000000 BTC\n"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(options.path_for(ExportFormat::Json)).unwrap())
            .unwrap();
    assert_eq!(json["addresses"].as_array().unwrap().len(), 2);
    assert_eq!(json["total_balance_btc"], "2.50000000");

    let csv = fs::read_to_string(options.path_for(ExportFormat::Csv)).unwrap();
    assert_eq!(csv.lines().next(), Some(CSV_HEADER));
    assert!(csv.contains("\"main \"\"hot\"\" wallet\""));

    let electrum: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(options.path_for(ExportFormat::Electrum)).unwrap(),
    )
    .unwrap();
    let keypairs = electrum["keystore"]["keypairs"].as_object().unwrap();
    assert_eq!(keypairs.len(), 1);
    assert!(keypairs.contains_key("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"));
}

#[test]
fn test_selected_formats_only() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions::default()
        .with_output_dir(dir.path())
        .with_formats(vec![ExportFormat::Csv]);

    let outcomes = export_all(&keys(), &options);
    assert_eq!(outcomes.len(), 1);
    assert!(options.path_for(ExportFormat::Csv).exists());
    assert!(!options.path_for(ExportFormat::Json).exists());
}

#[test]
fn test_one_failing_format_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions::default().with_output_dir(dir.path());

    // A directory where the JSON file should go makes that write fail
    fs::create_dir(options.path_for(ExportFormat::Json)).unwrap();

    let outcomes = export_all(&keys(), &options);
    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].format, ExportFormat::Json);
    assert!(matches!(failed[0].result, Err(ExportError::CreateFile { .. })));

    assert!(options.path_for(ExportFormat::Text).is_file());
    assert!(options.path_for(ExportFormat::Csv).is_file());
    assert!(options.path_for(ExportFormat::Electrum).is_file());
}

#[test]
fn test_individual_writers() {
    let dir = tempfile::tempdir().unwrap();
    let keys = keys();

    export_to_text(&keys, dir.path().join("a.txt")).unwrap();
    export_to_json(&keys, dir.path().join("a.json")).unwrap();
    export_to_csv(&keys, dir.path().join("a.csv")).unwrap();
    export_to_electrum(&keys, dir.path().join("a_electrum.json")).unwrap();

    let err = export_to_csv(&keys, dir.path().join("missing/dir/a.csv")).unwrap_err();
    assert!(matches!(err, ExportError::CreateFile { .. }));
}

#[test]
fn test_empty_key_list() {
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions::default().with_output_dir(dir.path());
    assert!(export_all(&[], &options).iter().all(|o| o.is_ok()));

    let text = fs::read_to_string(options.path_for(ExportFormat::Text)).unwrap();
    assert!(text.contains("Funded Addresses: 0/0"));
    let csv = fs::read_to_string(options.path_for(ExportFormat::Csv)).unwrap();
    assert_eq!(csv.lines().count(), 1);
}
