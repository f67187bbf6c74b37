//! Pure renderers for the export formats

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    common::format_btc,
    errors::ExportError,
    keys::{RecoveredKey, WalletStats},
};

pub const CSV_HEADER: &str = "Address,Private_Key_WIF,Private_Key_Hex,Public_Key_Hex,Compressed,Label,Balance_BTC,Balance_Satoshis,Transaction_Count,Has_Balance";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Human-readable report
pub fn render_text(keys: &[RecoveredKey], generated: &str) -> String {
    let stats = WalletStats::from_keys(keys);
    let mut out = String::new();

    out.push_str("Bitcoin Wallet Recovery Results\n");
    out.push_str(&format!("Generated: {generated}\n"));
    out.push_str(&format!("Total Addresses: {}\n\n", keys.len()));

    for key in keys {
        out.push_str(&format!("Address: {}\n", key.address));
        out.push_str(&format!("Private Key (WIF): {}\n", key.private_key_wif));
        out.push_str(&format!("Private Key (Hex): {}\n", key.private_key_hex));
        out.push_str(&format!("Public Key: {}\n", key.public_key_hex));
        out.push_str(&format!("Compressed: {}\n", yes_no(key.compressed)));
        if !key.label.is_empty() {
            out.push_str(&format!("Label: {}\n", key.label));
        }
        out.push_str(&format!("Balance: {} BTC\n", format_btc(key.balance_satoshis)));
        out.push_str(&format!("Transactions: {}\n", key.tx_count));
        out.push_str(&format!("Has Funds: {}\n\n", yes_no(key.has_balance)));
    }

    out.push_str("Summary:\n");
    out.push_str(&format!("Total Balance: {} BTC\n", format_btc(stats.total_balance)));
    out.push_str(&format!(
        "Funded Addresses: {}/{}\n",
        stats.funded_addresses,
        keys.len()
    ));
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    recovery_timestamp: &'a str,
    total_addresses: usize,
    addresses: Vec<JsonAddress<'a>>,
    total_balance_satoshis: u64,
    total_balance_btc: String,
    funded_addresses: usize,
}

#[derive(Serialize)]
struct JsonAddress<'a> {
    address: &'a str,
    private_key_wif: &'a str,
    private_key_hex: &'a str,
    public_key_hex: &'a str,
    compressed: bool,
    label: &'a str,
    balance_satoshis: u64,
    balance_btc: String,
    transaction_count: i32,
    has_balance: bool,
}

impl<'a> From<&'a RecoveredKey> for JsonAddress<'a> {
    fn from(key: &'a RecoveredKey) -> Self {
        Self {
            address: &key.address,
            private_key_wif: &key.private_key_wif,
            private_key_hex: &key.private_key_hex,
            public_key_hex: &key.public_key_hex,
            compressed: key.compressed,
            label: &key.label,
            balance_satoshis: key.balance_satoshis,
            balance_btc: format_btc(key.balance_satoshis),
            transaction_count: key.tx_count,
            has_balance: key.has_balance,
        }
    }
}

/// Full machine-readable report, pretty printed
pub fn render_json(keys: &[RecoveredKey], generated: &str) -> Result<String, ExportError> {
    let stats = WalletStats::from_keys(keys);
    let report = JsonReport {
        recovery_timestamp: generated,
        total_addresses: keys.len(),
        addresses: keys.iter().map(JsonAddress::from).collect(),
        total_balance_satoshis: stats.total_balance,
        total_balance_btc: format_btc(stats.total_balance),
        funded_addresses: stats.funded_addresses,
    };
    serde_json::to_string_pretty(&report).map_err(|e| ExportError::serialization("json", e.to_string()))
}

/// Double-quote a CSV field, doubling embedded quotes
fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// One header line plus one row per key
pub fn render_csv(keys: &[RecoveredKey]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for key in keys {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            key.address,
            key.private_key_wif,
            key.private_key_hex,
            key.public_key_hex,
            key.compressed,
            quote_csv(&key.label),
            format_btc(key.balance_satoshis),
            key.balance_satoshis,
            key.tx_count,
            key.has_balance,
        ));
    }
    out
}

#[derive(Serialize)]
struct ElectrumWallet<'a> {
    keystore: ElectrumKeystore<'a>,
    wallet_type: &'static str,
    use_encryption: bool,
}

#[derive(Serialize)]
struct ElectrumKeystore<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    keypairs: BTreeMap<&'a str, &'a str>,
}

/// Electrum imported-keys wallet holding only addresses that were ever used
pub fn render_electrum(keys: &[RecoveredKey]) -> Result<String, ExportError> {
    let wallet = ElectrumWallet {
        keystore: ElectrumKeystore {
            kind: "imported",
            keypairs: keys
                .iter()
                .filter(|k| k.has_activity())
                .map(|k| (k.address.as_str(), k.private_key_wif.as_str()))
                .collect(),
        },
        wallet_type: "standard",
        use_encryption: false,
    };
    serde_json::to_string_pretty(&wallet)
        .map_err(|e| ExportError::serialization("electrum", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(address: &str, label: &str, balance: u64, tx_count: i32) -> RecoveredKey {
        let mut key = RecoveredKey::new(
            address.to_string(),
            "01".repeat(32),
            format!("wif-{address}"),
            "02ab".to_string(),
            true,
            label.to_string(),
        );
        key.balance_satoshis = balance;
        key.tx_count = tx_count;
        key.has_balance = balance > 0;
        key
    }

    #[test]
    fn test_text_layout() {
        let keys = vec![key("1A", "main", 150_000_000, 2), key("1B", "", 0, 0)];
        let text = render_text(&keys, "2024-01-01 00:00:00");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Bitcoin Wallet Recovery Results");
        assert_eq!(lines[1], "Generated: 2024-01-01 00:00:00");
        assert_eq!(lines[2], "Total Addresses: 2");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Address: 1A");
        assert!(text.contains("Label: main\n"));
        assert!(text.contains("Balance: 1.50000000 BTC\n"));
        assert!(text.contains("Has Funds: Yes\n"));
        assert_eq!(text.matches("Label:").count(), 1);
        assert!(text.ends_with(
            "Summary:\nTotal Balance: 1.50000000 BTC\nFunded Addresses: 1/2\n"
        ));
    }

    #[test]
    fn test_json_schema() {
        let keys = vec![key("1A", "", 42, 1)];
        let json = render_json(&keys, "now").unwrap();
        assert!(json.contains("\n  \"recovery_timestamp\": \"now\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_addresses"], 1);
        assert_eq!(value["total_balance_satoshis"], 42);
        assert_eq!(value["total_balance_btc"], "0.00000042");
        assert_eq!(value["funded_addresses"], 1);

        let entry = &value["addresses"][0];
        assert_eq!(entry["address"], "1A");
        assert_eq!(entry["balance_btc"], "0.00000042");
        assert_eq!(entry["transaction_count"], 1);
        assert_eq!(entry["has_balance"], true);
        assert_eq!(entry["compressed"], true);
    }

    #[test]
    fn test_csv_rows_and_quoting() {
        let keys = vec![key("1A", "say \"hi\", ok", 0, 0)];
        let csv = render_csv(&keys);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1A,wif-1A,"));
        assert!(row.contains(",true,\"say \"\"hi\"\", ok\",0.00000000,0,0,false"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_empty_label_is_quoted() {
        let csv = render_csv(&[key("1A", "", 0, 0)]);
        assert!(csv.lines().nth(1).unwrap().contains(",\"\","));
    }

    #[test]
    fn test_electrum_filters_unused() {
        let keys = vec![
            key("1Funded", "", 10, 1),
            key("1Used", "", 0, 3),
            key("1Unused", "", 0, 0),
        ];
        let value: serde_json::Value =
            serde_json::from_str(&render_electrum(&keys).unwrap()).unwrap();
        let keypairs = value["keystore"]["keypairs"].as_object().unwrap();
        assert_eq!(keypairs.len(), 2);
        assert_eq!(keypairs["1Funded"], "wif-1Funded");
        assert!(!keypairs.contains_key("1Unused"));
        assert_eq!(value["keystore"]["type"], "imported");
        assert_eq!(value["wallet_type"], "standard");
        assert_eq!(value["use_encryption"], false);
    }
}
