use std::sync::Arc;

use chrono::DateTime;
use yfdesk::{CacheMode, DeskError, Frequency, Period, StatementKind, UpgradeDowngradeRow};

use crate::common::{FakeProvider, desk};

fn upgrade(ts: i64, firm: &str) -> UpgradeDowngradeRow {
    UpgradeDowngradeRow {
        ts: DateTime::from_timestamp(ts, 0).unwrap(),
        firm: Some(firm.to_string()),
        to_grade: Some("Buy".into()),
        from_grade: Some("Hold".into()),
        action: Some("up".into()),
    }
}

#[tokio::test]
async fn list_accessors_truncate_to_their_limit() {
    let desk = desk(Arc::new(FakeProvider::new()));

    assert_eq!(desk.recommendations("AAPL", 5).await.unwrap().len(), 5);
    assert_eq!(desk.earnings_history("AAPL", 12).await.unwrap().len(), 12);
    assert_eq!(desk.insider_trades("AAPL", 30).await.unwrap().len(), 30);

    let holders = desk.institutional_holders("AAPL", 20).await.unwrap();
    assert_eq!(holders.institutional.len(), 20);
    assert_eq!(holders.mutual_fund.len(), 20);
    assert_eq!(holders.institutional[0].organization, "Institution 0");
}

#[tokio::test]
async fn upgrades_are_newest_first() {
    let mut provider = FakeProvider::new();
    provider.upgrades = vec![
        upgrade(1_000, "A"),
        upgrade(3_000, "C"),
        upgrade(2_000, "B"),
        upgrade(500, "Z"),
    ];
    let desk = desk(Arc::new(provider));

    let rows = desk.upgrades_downgrades("AAPL", 3).await.unwrap();
    let firms: Vec<_> = rows.iter().map(|r| r.firm.as_deref().unwrap()).collect();
    assert_eq!(firms, ["C", "B", "A"]);
}

#[tokio::test]
async fn provider_failure_names_the_dataset_and_symbol() {
    let desk = desk(Arc::new(FakeProvider::new().failing("calendar")));

    let err = desk.calendar("MSFT").await.unwrap_err();

    assert!(matches!(
        err,
        DeskError::Provider {
            endpoint: "calendar",
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Error retrieving calendar for MSFT: Data format unexpected or missing field: scripted failure for calendar"
    );
}

#[tokio::test]
async fn parameters_are_part_of_the_cache_identity() {
    let provider = Arc::new(FakeProvider::new());
    let desk = desk(provider.clone());

    desk.price_history("AAPL", Period::M1).await.unwrap();
    desk.price_history("AAPL", Period::M1).await.unwrap();
    desk.price_history("AAPL", Period::Y1).await.unwrap();
    desk.financial_statements("AAPL", StatementKind::Income, Frequency::Quarterly)
        .await
        .unwrap();
    desk.financial_statements("AAPL", StatementKind::Income, Frequency::Annual)
        .await
        .unwrap();

    assert_eq!(provider.count("price_history:1mo"), 1);
    assert_eq!(provider.count("price_history:1y"), 1);
    assert_eq!(provider.count("financial_statement"), 2);
}

#[tokio::test]
async fn limits_apply_to_cached_payloads_too() {
    let provider = Arc::new(FakeProvider::new());
    let desk = desk(provider.clone());

    assert_eq!(desk.recommendations("AAPL", 2).await.unwrap().len(), 2);
    assert_eq!(desk.recommendations("AAPL", 7).await.unwrap().len(), 7);
    assert_eq!(provider.count("recommendations"), 1);
}

#[tokio::test]
async fn bypass_handle_always_calls_the_provider() {
    let provider = Arc::new(FakeProvider::new());
    let desk = desk(provider.clone());
    let live = desk.with_cache_mode(CacheMode::Bypass);

    desk.info("AAPL").await.unwrap();
    live.info("AAPL").await.unwrap();
    live.info("AAPL").await.unwrap();
    let info = desk.info("AAPL").await.unwrap();

    assert_eq!(info["symbol"], "AAPL");
    assert_eq!(provider.count("info"), 3);
}
