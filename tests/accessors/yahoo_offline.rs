use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use serde_json::json;
use yfdesk::{Desk, Frequency, MarketDataProvider, Period, StatementKind};

use crate::common::{
    date, limited_gate, mock_cookie_crumb, setup_server, yahoo_builder, yahoo_for, yahoo_preauth,
};

fn quote_summary(result: serde_json::Value) -> String {
    json!({ "quoteSummary": { "result": [result], "error": null } }).to_string()
}

#[tokio::test]
async fn quote_summary_bootstraps_cookie_and_crumb() {
    let server = setup_server();
    let (cookie, crumb) = mock_cookie_crumb(&server);
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", "recommendationTrend")
            .query_param("crumb", "crumb-value");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({
                "recommendationTrend": { "trend": [
                    { "period": "0m", "strongBuy": 7, "buy": 21, "hold": 14, "sell": 1, "strongSell": 2 },
                    { "period": "-1m", "strongBuy": 8, "buy": 20, "hold": 13, "sell": 1, "strongSell": 1 }
                ]}
            })));
    });

    let yahoo = yahoo_for(&server);
    let rows = yahoo.recommendations("AAPL").await.unwrap();
    // Credentials are fetched once and reused.
    yahoo.recommendations("AAPL").await.unwrap();

    cookie.assert_calls(1);
    crumb.assert_calls(1);
    api.assert_calls(2);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].period, "0m");
    assert_eq!(rows[0].buy, 21);
    assert_eq!(rows[1].strong_sell, 1);
}

#[tokio::test]
async fn invalid_crumb_is_refreshed_once() {
    let server = setup_server();
    let (cookie, crumb) = mock_cookie_crumb(&server);
    let stale = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("crumb", "crumb");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                json!({ "quoteSummary": { "result": null, "error": { "code": "Unauthorized", "description": "Invalid Crumb" } } })
                    .to_string(),
            );
    });
    let fresh = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("crumb", "crumb-value");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({ "calendarEvents": {
                "earnings": {
                    "earningsDate": [{ "raw": 1_761_854_400, "fmt": "2025-10-30" }],
                    "earningsAverage": { "raw": 1.77, "fmt": "1.77" },
                    "revenueAverage": { "raw": 101_000_000_000_i64, "fmt": "101B" }
                },
                "exDividendDate": { "raw": 1_754_870_400, "fmt": "2025-08-11" }
            }})));
    });

    let yahoo = yahoo_preauth(&server);
    let cal = yahoo.calendar("AAPL").await.unwrap();

    stale.assert_calls(1);
    fresh.assert_calls(1);
    cookie.assert_calls(1);
    crumb.assert_calls(1);
    assert_eq!(cal.earnings_dates, vec![date("2025-10-30")]);
    assert_eq!(cal.earnings_average, Some(1.77));
    assert_eq!(cal.revenue_average, Some(101_000_000_000.0));
    assert_eq!(cal.ex_dividend_date, Some(date("2025-08-11")));
    assert_eq!(cal.dividend_date, None);
}

#[tokio::test]
async fn upgrades_without_timestamp_are_dropped() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/GOOGL")
            .query_param("modules", "upgradeDowngradeHistory");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({ "upgradeDowngradeHistory": { "history": [
                { "epochGradeDate": 2000, "firm": "B", "fromGrade": "Hold", "toGrade": "Buy", "action": "up" },
                { "firm": "NoDate", "toGrade": "Sell" },
                { "epochGradeDate": 1000, "firm": "A", "fromGrade": "Sell", "toGrade": "Hold", "gradeChange": "up" }
            ]}})));
    });

    let rows = yahoo_preauth(&server)
        .upgrades_downgrades("GOOGL")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].firm.as_deref(), Some("A"));
    assert_eq!(rows[1].action.as_deref(), Some("up"));
}

#[tokio::test]
async fn quarterly_income_statement_is_flattened() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/MSFT")
            .query_param("modules", "incomeStatementHistoryQuarterly");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({ "incomeStatementHistoryQuarterly": {
                "incomeStatementHistory": [
                    {
                        "maxAge": 1,
                        "endDate": { "raw": 1_719_705_600, "fmt": "2024-06-30" },
                        "totalRevenue": { "raw": 64_727_000_000_i64, "fmt": "64.73B" },
                        "netIncome": { "raw": 22_036_000_000_i64, "fmt": "22.04B" },
                        "discontinuedOperations": {}
                    },
                    {
                        "endDate": { "raw": 1_711_843_200, "fmt": "2024-03-31" },
                        "totalRevenue": { "raw": 61_858_000_000_i64, "fmt": "61.86B" }
                    }
                ]
            }})));
    });

    let rows = yahoo_preauth(&server)
        .financial_statement("MSFT", StatementKind::Income, Frequency::Quarterly)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].period_end, date("2024-06-30"));
    assert_eq!(rows[0].items["netIncome"], 22_036_000_000.0);
    assert!(!rows[0].items.contains_key("discontinuedOperations"));
    assert_eq!(rows[1].items.len(), 1);
}

#[tokio::test]
async fn holders_and_insiders_map_raw_values() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", "institutionOwnership,fundOwnership");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({
                "institutionOwnership": { "ownershipList": [{
                    "organization": "Vanguard Group Inc",
                    "position": { "raw": 1_415_932_000_i64 },
                    "pctHeld": { "raw": 0.0947 },
                    "value": { "raw": 3.2e11 },
                    "reportDate": { "raw": 1_743_379_200 }
                }]},
                "fundOwnership": { "ownershipList": [] }
            })));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", "insiderTransactions");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({ "insiderTransactions": { "transactions": [{
                "filerName": "COOK TIMOTHY D",
                "filerRelation": "Chief Executive Officer",
                "transactionText": "Sale at price 223.00 per share.",
                "shares": { "raw": 108_136 },
                "value": { "raw": 24_184_658 },
                "startDate": { "raw": 1_743_638_400 },
                "filerUrl": ""
            }]}})));
    });

    let yahoo = yahoo_preauth(&server);
    let holders = yahoo.holders("AAPL").await.unwrap();
    let trades = yahoo.insider_transactions("AAPL").await.unwrap();

    assert_eq!(holders.institutional.len(), 1);
    assert!(holders.mutual_fund.is_empty());
    let v = &holders.institutional[0];
    assert_eq!(v.shares, Some(1_415_932_000));
    assert_eq!(v.value, Some(320_000_000_000));
    assert_eq!(v.date_reported, Some(date("2025-03-31")));

    assert_eq!(trades[0].insider, "COOK TIMOTHY D");
    assert_eq!(trades[0].shares, Some(108_136));
    assert_eq!(trades[0].start_date, Some(date("2025-04-03")));
    assert_eq!(trades[0].url, None);
}

#[tokio::test]
async fn earnings_history_and_info() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("modules", "earningsHistory");
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({ "earningsHistory": { "history": [{
                "quarter": { "raw": 1_735_603_200, "fmt": "2024-12-31" },
                "period": "-4q",
                "epsActual": { "raw": 2.4 },
                "epsEstimate": { "raw": 2.35 },
                "epsDifference": { "raw": 0.05 },
                "surprisePercent": { "raw": 0.0213 }
            }]}})));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param(
                "modules",
                "assetProfile,summaryDetail,defaultKeyStatistics,financialData,price,quoteType",
            );
        then.status(200)
            .header("content-type", "application/json")
            .body(quote_summary(json!({
                "assetProfile": { "sector": "Technology", "fullTimeEmployees": 164_000 },
                "summaryDetail": { "marketCap": { "raw": 3.4e12, "fmt": "3.4T" } },
                "quoteType": { "quoteType": "EQUITY" }
            })));
    });

    let yahoo = yahoo_preauth(&server);
    let earnings = yahoo.earnings_history("AAPL").await.unwrap();
    let info = yahoo.info("AAPL").await.unwrap();

    assert_eq!(earnings[0].quarter, Some(date("2024-12-31")));
    assert_eq!(earnings[0].period.as_deref(), Some("-4q"));
    assert_eq!(earnings[0].eps_actual, Some(2.4));

    assert_eq!(info["sector"], "Technology");
    assert_eq!(info["marketCap"], json!(3.4e12));
    assert_eq!(info["quoteType"], "EQUITY");
}

#[tokio::test]
async fn chart_bars_are_daily_candles() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v8/finance/chart/AAPL")
            .query_param("range", "5d")
            .query_param("interval", "1d");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                json!({ "chart": { "result": [{
                    "meta": { "currency": "USD" },
                    "timestamp": [1_735_828_200, 1_735_914_600],
                    "indicators": {
                        "quote": [{
                            "open": [248.9, 243.4],
                            "high": [249.1, 244.2],
                            "low": [241.8, 241.9],
                            "close": [243.9, 243.4],
                            "volume": [55_740_700, 40_244_100]
                        }],
                        "adjclose": [{ "adjclose": [243.3, 242.8] }]
                    }
                }], "error": null }})
                .to_string(),
            );
    });

    let bars = yahoo_preauth(&server)
        .price_history("AAPL", Period::D5)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, 243.9);
    assert_eq!(bars[0].adj_close, Some(243.3));
    assert_eq!(bars[1].volume, Some(40_244_100));
}

#[tokio::test]
async fn chart_error_is_reported() {
    let server = setup_server();
    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/NOPE");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                json!({ "chart": { "result": null, "error": {
                    "code": "Not Found", "description": "No data found, symbol may be delisted"
                }}})
                .to_string(),
            );
    });

    let err = yahoo_preauth(&server)
        .price_history("NOPE", Period::M1)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("symbol may be delisted"));
}

fn empty_trend() -> String {
    quote_summary(json!({ "recommendationTrend": { "trend": [] } }))
}

#[tokio::test]
async fn credential_requests_take_their_own_permits() {
    let server = setup_server();
    let (cookie, crumb) = mock_cookie_crumb(&server);
    let api = server.mock(|when, then| {
        when.method(GET).path("/v10/finance/quoteSummary/AAPL");
        then.status(200)
            .header("content-type", "application/json")
            .body(empty_trend());
    });

    let gate = limited_gate(1, Duration::from_secs(60));
    let yahoo = yahoo_builder(&server)
        .rate_limiter(gate.limiter())
        .build()
        .unwrap();
    let desk = Desk::builder(Arc::new(yahoo)).gate(gate).build();

    // The call's permit goes to the cookie request; the crumb waits for the window to slide.
    let stalled =
        tokio::time::timeout(Duration::from_millis(500), desk.recommendations("AAPL", 5)).await;

    assert!(stalled.is_err());
    cookie.assert_calls(1);
    crumb.assert_calls(0);
    api.assert_calls(0);
}

#[tokio::test]
async fn single_request_call_needs_only_the_gate_permit() {
    let server = setup_server();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v10/finance/quoteSummary/AAPL")
            .query_param("crumb", "crumb");
        then.status(200)
            .header("content-type", "application/json")
            .body(empty_trend());
    });

    let gate = limited_gate(1, Duration::from_secs(60));
    let yahoo = yahoo_builder(&server)
        .preauth("cookie", "crumb")
        .rate_limiter(gate.limiter())
        .build()
        .unwrap();
    let desk = Desk::builder(Arc::new(yahoo)).gate(gate).build();

    let rows = tokio::time::timeout(Duration::from_secs(5), desk.recommendations("AAPL", 5))
        .await
        .expect("call waited for a second permit")
        .unwrap();

    assert!(rows.is_empty());
    api.assert_calls(1);
}
