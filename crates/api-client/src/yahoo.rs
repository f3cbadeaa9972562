// In crates/api-client/src/yahoo.rs

//! Parsing of chart and fundamentals time-series responses.

use crate::error::{Error, Result};
use crate::types::{ChartEnvelope, RawQuote, UpstreamError};
use chrono::DateTime;
use core_types::{FundamentalsSnapshot, OhlcvFrame};
use serde_json::Value;

pub const NET_INCOME_SERIES: &str = "quarterlyNetIncome";
pub const TOTAL_REVENUE_SERIES: &str = "quarterlyTotalRevenue";

/// Converts a chart response into a frame, oldest bar first.
///
/// Sessions with a null high, low or close are dropped. A response without a close
/// column yields a frame whose `close` is `None`; an empty result yields an empty frame.
pub fn parse_chart_response(body: &str) -> Result<OhlcvFrame> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(Error::ApiError { code: err.code, msg: err.description });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(OhlcvFrame::default());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    Ok(frame_from_quote(&result.timestamp, &quote))
}

fn frame_from_quote(timestamps: &[i64], quote: &RawQuote) -> OhlcvFrame {
    let at = |column: &Option<Vec<Option<f64>>>, i: usize| {
        column.as_ref().and_then(|c| c.get(i).copied().flatten())
    };

    let mut frame = OhlcvFrame {
        open: quote.open.as_ref().map(|_| Vec::new()),
        close: quote.close.as_ref().map(|_| Vec::new()),
        volume: quote.volume.as_ref().map(|_| Vec::new()),
        ..OhlcvFrame::default()
    };

    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(high), Some(low)) = (at(&quote.high, i), at(&quote.low, i)) else {
            continue;
        };
        let close = at(&quote.close, i);
        if quote.close.is_some() && close.is_none() {
            continue;
        }
        let Some(date) = DateTime::from_timestamp(*ts, 0) else {
            continue;
        };

        frame.dates.push(date);
        frame.high.push(high);
        frame.low.push(low);
        if let (Some(closes), Some(close)) = (frame.close.as_mut(), close) {
            closes.push(close);
        }
        if let Some(opens) = frame.open.as_mut() {
            opens.push(at(&quote.open, i).or(close).unwrap_or(low));
        }
        if let Some(volumes) = frame.volume.as_mut() {
            volumes.push(at(&quote.volume, i).unwrap_or(0.0));
        }
    }

    frame
}

/// Extracts quarterly net income and total revenue, most recent quarter first.
pub fn parse_fundamentals_response(body: &str) -> Result<FundamentalsSnapshot> {
    let value: Value = serde_json::from_str(body)?;
    let timeseries = &value["timeseries"];

    if let Some(err) = timeseries.get("error").filter(|e| !e.is_null()) {
        let err: UpstreamError = serde_json::from_value(err.clone())?;
        return Err(Error::ApiError { code: err.code, msg: err.description });
    }

    let results = timeseries["result"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    Ok(FundamentalsSnapshot::from_quarters(
        quarterly_values(results, NET_INCOME_SERIES),
        quarterly_values(results, TOTAL_REVENUE_SERIES),
    ))
}

fn quarterly_values(results: &[Value], series: &str) -> Vec<Option<f64>> {
    let mut points: Vec<(&str, Option<f64>)> = results
        .iter()
        .filter_map(|r| r.get(series).and_then(Value::as_array))
        .flatten()
        .filter(|point| !point.is_null())
        .map(|point| {
            (
                point["asOfDate"].as_str().unwrap_or_default(),
                point["reportedValue"]["raw"].as_f64(),
            )
        })
        .collect();

    // ISO dates sort lexicographically.
    points.sort_by(|a, b| b.0.cmp(a.0));
    points.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "ACME"},
                "timestamp": [1704067200, 1704153600, 1704240000, 1704326400],
                "indicators": {"quote": [{
                    "open":   [10.0, 11.0, null, 12.5],
                    "high":   [10.5, 11.5, 12.0, 13.0],
                    "low":    [9.5, 10.5, 11.0, 12.0],
                    "close":  [10.2, 11.2, null, 12.8],
                    "volume": [1000, 1200, 0, null]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_rows_without_close_are_dropped() {
        let frame = parse_chart_response(CHART).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.close.as_deref(), Some(&[10.2, 11.2, 12.8][..]));
        assert_eq!(frame.volume.as_deref(), Some(&[1000.0, 1200.0, 0.0][..]));
        assert_eq!(frame.dates[0].timestamp(), 1704067200);
    }

    #[test]
    fn chart_without_close_column_has_no_close() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704067200],
            "indicators":{"quote":[{"high":[2.0],"low":[1.0]}]}}],"error":null}}"#;
        let frame = parse_chart_response(body).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(!frame.has_close());
    }

    #[test]
    fn chart_error_is_surfaced() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response(body).unwrap_err();
        assert!(matches!(err, Error::ApiError { code, .. } if code == "Not Found"));
    }

    #[test]
    fn empty_chart_result_is_an_empty_frame() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart_response(body).unwrap().is_empty());
    }

    #[test]
    fn fundamentals_are_ordered_most_recent_first() {
        let body = r#"{"timeseries":{"result":[
            {"meta":{"type":["quarterlyNetIncome"]},
             "quarterlyNetIncome":[
                {"asOfDate":"2024-03-31","reportedValue":{"raw":50.0}},
                {"asOfDate":"2024-06-30","reportedValue":{"raw":100.0}},
                null,
                {"asOfDate":"2024-09-30","reportedValue":{"raw":150.0}},
                {"asOfDate":"2024-12-31","reportedValue":{"raw":200.0}}]},
            {"meta":{"type":["quarterlyTotalRevenue"]},
             "quarterlyTotalRevenue":[
                {"asOfDate":"2024-09-30","reportedValue":{"raw":300.0}},
                {"asOfDate":"2024-12-31"}]}
        ],"error":null}}"#;

        let snapshot = parse_fundamentals_response(body).unwrap();
        assert_eq!(snapshot.net_income, vec![200.0, 150.0, 100.0, 50.0]);
        // The quarter without a reported value is discarded.
        assert_eq!(snapshot.total_revenue, vec![300.0]);
    }
}
