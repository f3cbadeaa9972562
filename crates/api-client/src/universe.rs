// In crates/api-client/src/universe.rs

//! Index membership: S&P 500 constituents and Hong Kong main board codes.

use crate::error::{Error, Result};
use scraper::{Html, Selector};

/// Parses the constituents table of the S&P 500 listing page into provider tickers.
///
/// Class-share dots are written with a dash (`BRK.B` becomes `BRK-B`).
pub fn parse_sp500_table(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let rows = Selector::parse("table#constituents tbody tr")
        .map_err(|e| Error::Parse(format!("Invalid selector: {e}")))?;
    let cells = Selector::parse("td")
        .map_err(|e| Error::Parse(format!("Invalid selector: {e}")))?;

    let tickers: Vec<String> = document
        .select(&rows)
        .filter_map(|row| row.select(&cells).next())
        .map(|cell| cell.text().collect::<String>().trim().replace('.', "-"))
        .filter(|ticker| !ticker.is_empty())
        .collect();

    if tickers.is_empty() {
        return Err(Error::Parse(
            "No constituents found in the S&P 500 listing".to_string(),
        ));
    }
    Ok(tickers)
}

/// Converts an exchange stock code to the provider's `.HK` form.
///
/// The code is zero-padded to five digits, then one leading zero is dropped:
/// `1` → `0001.HK`, `01000` → `1000.HK`, `80011` → `80011.HK`.
pub fn to_yahoo_hk_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{code:0>5}");
    let trimmed = padded.strip_prefix('0').unwrap_or(&padded);
    Some(format!("{trimmed}.HK"))
}

/// Whether a stock code belongs to the main board. GEM codes (08000–08999) do not.
pub fn is_main_board(code: &str) -> bool {
    match code.trim().parse::<u32>() {
        Ok(number) => !(8_000..=8_999).contains(&number),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hk_code_conversion() {
        assert_eq!(to_yahoo_hk_code("00001").as_deref(), Some("0001.HK"));
        assert_eq!(to_yahoo_hk_code("1").as_deref(), Some("0001.HK"));
        assert_eq!(to_yahoo_hk_code("700").as_deref(), Some("0700.HK"));
        assert_eq!(to_yahoo_hk_code("01000").as_deref(), Some("1000.HK"));
        assert_eq!(to_yahoo_hk_code("80011").as_deref(), Some("80011.HK"));
        assert_eq!(to_yahoo_hk_code("TCEHY"), None);
    }

    #[test]
    fn gem_codes_are_not_main_board() {
        assert!(is_main_board("700"));
        assert!(is_main_board("80011"));
        assert!(!is_main_board("8001"));
        assert!(!is_main_board("08999"));
        assert!(!is_main_board("n/a"));
    }

    #[test]
    fn sp500_table_rows_become_tickers() {
        let html = r#"<html><body>
            <table id="constituents"><tbody>
                <tr><th>Symbol</th><th>Security</th></tr>
                <tr><td><a href="/x">MMM</a></td><td>3M</td></tr>
                <tr><td>BRK.B</td><td>Berkshire Hathaway</td></tr>
                <tr><td> AAPL
                </td><td>Apple Inc.</td></tr>
            </tbody></table>
            <table id="changes"><tbody><tr><td>IGNORED</td></tr></tbody></table>
        </body></html>"#;

        assert_eq!(parse_sp500_table(html).unwrap(), vec!["MMM", "BRK-B", "AAPL"]);
    }

    #[test]
    fn page_without_table_is_an_error() {
        assert!(parse_sp500_table("<html></html>").is_err());
    }
}
