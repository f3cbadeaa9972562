use api_client::{ApiClient, Error, MarketDataProvider, ScreenPreset};
use app_config::types::{MarketDataSettings, ScreenerSettings};
use core_types::Symbol;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let market_data = MarketDataSettings {
        chart_base_url: format!("{}/v8/finance/chart", server.uri()),
        fundamentals_base_url: format!("{}/timeseries", server.uri()),
        user_agent: "test-agent".to_string(),
        request_timeout_secs: 5,
        stage2_range: "2y".to_string(),
        stage2_interval: "1d".to_string(),
        volume_interval: "1wk".to_string(),
    };
    let screener = ScreenerSettings {
        scanner_base_url: server.uri(),
        sp500_source_url: format!("{}/sp500", server.uri()),
        ..ScreenerSettings::default()
    };
    ApiClient::new(&market_data, &screener).unwrap()
}

#[tokio::test]
async fn history_requests_range_and_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "6mo"))
        .and(query_param("interval", "1wk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {"result": [{
                "timestamp": [1704067200, 1704672000],
                "indicators": {"quote": [{
                    "open": [1.0, 2.0], "high": [1.5, 2.5], "low": [0.5, 1.5],
                    "close": [1.2, 2.2], "volume": [100, 200]
                }]}
            }], "error": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let frame = client_for(&server)
        .history(&Symbol::new("AAPL"), "6mo", "1wk")
        .await
        .unwrap();

    assert_eq!(frame.len(), 2);
    assert_eq!(frame.close.as_deref(), Some(&[1.2, 2.2][..]));
}

#[tokio::test]
async fn unknown_symbol_surfaces_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .history(&Symbol::new("NOPE"), "2y", "1d")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ApiError { ref code, .. } if code == "Not Found"));
}

#[tokio::test]
async fn non_json_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .quarterly_fundamentals(&Symbol::new("AAPL"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ApiError { ref code, .. } if code == "503"));
}

#[tokio::test]
async fn fundamentals_request_names_both_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/timeseries/MSFT"))
        .and(query_param("type", "quarterlyNetIncome,quarterlyTotalRevenue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timeseries": {"result": [
                {"quarterlyNetIncome": [
                    {"asOfDate": "2024-09-30", "reportedValue": {"raw": 10.0}},
                    {"asOfDate": "2024-12-31", "reportedValue": {"raw": 12.0}}
                ]}
            ], "error": null}
        })))
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .quarterly_fundamentals(&Symbol::new("MSFT"))
        .await
        .unwrap();

    assert_eq!(snapshot.net_income, vec![12.0, 10.0]);
    assert!(snapshot.total_revenue.is_empty());
}

#[tokio::test]
async fn screen_posts_preset_to_market_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/america/scan"))
        .and(body_partial_json(json!({"markets": ["america"], "preset": "all_stocks"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 2,
            "data": [{"s": "NASDAQ:NVDA", "d": ["NVDA"]}, {"s": "NYSE:ANET", "d": ["ANET"]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let names = client_for(&server)
        .screen(ScreenPreset::UsQualityTrend)
        .await
        .unwrap();

    assert_eq!(names, vec!["NVDA", "ANET"]);
}

#[tokio::test]
async fn hk_codes_keep_main_board_only_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hongkong/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 6,
            "data": [
                {"s": "HKEX:1", "d": ["1"]},
                {"s": "HKEX:700", "d": ["700"]},
                {"s": "HKEX:8001", "d": ["8001"]},
                {"s": "HKEX:80011", "d": ["80011"]},
                {"s": "HKEX:0700", "d": ["0700"]},
                {"s": "HKEX:00001", "d": ["00001"]}
            ]
        })))
        .mount(&server)
        .await;

    let codes = client_for(&server).hk_yahoo_codes().await.unwrap();

    assert_eq!(codes, vec!["0001.HK", "0700.HK", "80011.HK"]);
}

#[tokio::test]
async fn sp500_page_is_scraped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sp500"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table id="constituents"><tbody>
                 <tr><th>Symbol</th></tr>
                 <tr><td>AAPL</td></tr>
                 <tr><td>BF.B</td></tr>
               </tbody></table>"#,
        ))
        .mount(&server)
        .await;

    let tickers = client_for(&server).sp500_tickers().await.unwrap();

    assert_eq!(tickers, vec!["AAPL", "BF-B"]);
}
