// In crates/api-client/src/screener.rs

//! Request builder and presets for the stock scanner.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub left: String,
    pub operation: &'static str,
    /// Either a literal or the name of another column.
    pub right: Value,
}

impl Filter {
    pub fn greater(column: &str, value: impl Into<Value>) -> Self {
        Self { left: column.to_string(), operation: "greater", right: value.into() }
    }

    /// Compares two columns of the same row, e.g. `close > SMA50`.
    pub fn above_column(column: &str, other: &str) -> Self {
        Self { left: column.to_string(), operation: "greater", right: Value::from(other) }
    }

    pub fn equal(column: &str, value: impl Into<Value>) -> Self {
        Self { left: column.to_string(), operation: "equal", right: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    #[serde(rename = "sortOrder")]
    pub sort_order: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct QueryOptions {
    lang: &'static str,
}

/// A scan request. `market` is sent as the URL path, everything else as the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerQuery {
    #[serde(skip)]
    pub market: String,
    markets: Vec<String>,
    pub columns: Vec<String>,
    pub filter: Vec<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    options: QueryOptions,
    /// Row offsets `[from, to)`.
    pub range: [usize; 2],
}

impl ScreenerQuery {
    pub fn new(market: &str) -> Self {
        Self {
            market: market.to_string(),
            markets: vec![market.to_string()],
            columns: vec!["name".to_string()],
            filter: Vec::new(),
            sort: None,
            preset: None,
            options: QueryOptions { lang: "en" },
            range: [0, 50],
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter.push(filter);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.sort = Some(Sort {
            sort_by: column.to_string(),
            sort_order: if ascending { "asc" } else { "desc" },
        });
        self
    }

    pub fn preset(mut self, preset: &str) -> Self {
        self.preset = Some(preset.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.range = [0, limit];
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: usize,
    #[serde(default)]
    pub data: Vec<ScreenerRow>,
}

/// One matching row: the exchange-qualified symbol and the selected column values.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScreenerRow {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "d", default)]
    pub values: Vec<Value>,
}

impl ScreenerRow {
    /// The first selected column rendered as text. Presets select `name` first.
    pub fn name(&self) -> Option<String> {
        match self.values.first()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Every stock listed in Hong Kong, used as the HKEX universe.
pub fn hk_listing_query() -> ScreenerQuery {
    ScreenerQuery::new("hongkong")
        .select(&["name"])
        .filter(Filter::equal("type", "stock"))
        .limit(5_000)
}

/// The fixed screens offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenPreset {
    /// Large-cap HK stocks above their 50/100/200-day averages.
    HkQualityTrend,
    /// HK stocks whose recent volume is well above normal.
    HkVolumeSurge,
    /// Large-cap US stocks above their averages, most active first.
    UsQualityTrend,
}

impl ScreenPreset {
    pub const ALL: [ScreenPreset; 3] =
        [Self::HkQualityTrend, Self::HkVolumeSurge, Self::UsQualityTrend];

    pub fn query(self) -> ScreenerQuery {
        match self {
            Self::HkQualityTrend => ScreenerQuery::new("hongkong")
                .select(&["name"])
                .filter(Filter::greater("market_cap_basic", 10_000_000_000_u64))
                .filter(Filter::greater("beta_1_year", 1))
                .filter(Filter::above_column("close", "SMA50"))
                .filter(Filter::above_column("close", "SMA100"))
                .filter(Filter::above_column("close", "SMA200"))
                .filter(Filter::greater("Value.Traded|1M", 8_000_000))
                .limit(1_000),
            Self::HkVolumeSurge => ScreenerQuery::new("hongkong")
                .select(&["name"])
                .filter(Filter::greater("relative_volume_10d_calc|1M", 1.5))
                .filter(Filter::greater("volume_change|1M", 100))
                .filter(Filter::greater("average_volume_30d_calc|1M", 100_000))
                .filter(Filter::greater("Value.Traded|1M", 8_000_000))
                .filter(Filter::greater("close", 2))
                .limit(100),
            Self::UsQualityTrend => ScreenerQuery::new("america")
                .preset("all_stocks")
                .select(&["name"])
                .filter(Filter::greater("market_cap_basic", 2_000_000_000_u64))
                .filter(Filter::greater("beta_1_year", 1))
                .filter(Filter::above_column("close", "SMA50"))
                .filter(Filter::above_column("close", "SMA100"))
                .filter(Filter::above_column("close", "SMA200"))
                .filter(Filter::greater("Value.Traded|1M", 900_000_000))
                .order_by("relative_volume_10d_calc|1M", false)
                .limit(100),
        }
    }
}

impl fmt::Display for ScreenPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HkQualityTrend => "hk",
            Self::HkVolumeSurge => "hk-volume",
            Self::UsQualityTrend => "us",
        };
        f.write_str(name)
    }
}

impl FromStr for ScreenPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Parse(format!(
                    "Unknown screener preset '{s}'. Available presets: 'hk', 'hk-volume', 'us'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presets_round_trip_through_their_names() {
        for preset in ScreenPreset::ALL {
            assert_eq!(preset.to_string().parse::<ScreenPreset>().unwrap(), preset);
        }
        assert!("eu".parse::<ScreenPreset>().is_err());
    }

    #[test]
    fn us_preset_body_matches_scanner_format() {
        let query = ScreenPreset::UsQualityTrend.query();
        assert_eq!(query.market, "america");

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["markets"], json!(["america"]));
        assert_eq!(body["columns"], json!(["name"]));
        assert_eq!(body["preset"], json!("all_stocks"));
        assert_eq!(body["range"], json!([0, 100]));
        assert_eq!(
            body["sort"],
            json!({"sortBy": "relative_volume_10d_calc|1M", "sortOrder": "desc"})
        );
        assert_eq!(
            body["filter"][2],
            json!({"left": "close", "operation": "greater", "right": "SMA50"})
        );
        assert_eq!(body["filter"][5]["right"], json!(900_000_000));
        assert!(body.get("market").is_none());
    }

    #[test]
    fn hk_volume_preset_has_no_sort() {
        let body = serde_json::to_value(ScreenPreset::HkVolumeSurge.query()).unwrap();
        assert!(body.get("sort").is_none());
        assert_eq!(body["filter"].as_array().unwrap().len(), 5);
        assert_eq!(body["filter"][0]["right"], json!(1.5));
    }

    #[test]
    fn row_name_reads_first_column() {
        let response: ScanResponse = serde_json::from_value(json!({
            "totalCount": 2,
            "data": [{"s": "HKEX:700", "d": ["700"]}, {"s": "HKEX:5", "d": [5]}]
        }))
        .unwrap();
        let names: Vec<_> = response.data.iter().filter_map(ScreenerRow::name).collect();
        assert_eq!(names, vec!["700", "5"]);
    }
}
