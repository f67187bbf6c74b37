//! Shared formatting helpers

/// Satoshis per bitcoin
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Format a satoshi amount as BTC with eight decimal places
pub fn format_btc(satoshis: u64) -> String {
    format!(
        "{}.{:08}",
        satoshis / SATOSHIS_PER_BTC,
        satoshis % SATOSHIS_PER_BTC
    )
}

/// Format a number with thousands separators
pub fn format_number<T: ToString>(value: T) -> String {
    let digits = value.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", digits),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}

/// Local wall-clock timestamp used in recovery reports
pub fn current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
