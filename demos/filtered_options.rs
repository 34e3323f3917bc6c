use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use yfdesk::{Desk, FilterCriteria, OptionKind, Period, RequestGate, YahooProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "yfdesk=info".into()))
        .init();

    // 1. One gate for the whole process: 5 calls per second, responses cached for an hour.
    let gate = Arc::new(
        RequestGate::builder()
            .rate(5, Duration::from_secs(1))
            .ttl(Duration::from_secs(3600))
            .build()
            .await?,
    );

    // The provider shares the gate's limiter so cookie/crumb requests are counted too.
    let provider = YahooProvider::builder()
        .timeout(Duration::from_secs(10))
        .rate_limiter(gate.limiter())
        .build()?;

    let desk = Desk::builder(Arc::new(provider))
        .gate(gate)
        .aggregate_timeout(Duration::from_secs(60))
        .build();

    // 2. A couple of single-call accessors.
    let bars = desk.price_history("AAPL", Period::M1).await?;
    if let Some(last) = bars.last() {
        println!("AAPL last close: {:.2} ({} bars)", last.close, bars.len());
    }

    for rec in desk.recommendations("AAPL", 5).await? {
        println!(
            "  {:>4}: {} strong buy, {} buy, {} hold",
            rec.period, rec.strong_buy, rec.buy, rec.hold
        );
    }
    println!();

    // 3. Calls expiring in the next ~two months, strikes 150..=250, most liquid first.
    let today = chrono::Utc::now().date_naive();
    let criteria = FilterCriteria::new()
        .start_date(today.format("%Y-%m-%d").to_string())
        .end_date((today + chrono::Days::new(60)).format("%Y-%m-%d").to_string())
        .strike_lower(150.0)
        .strike_upper(250.0)
        .kind(OptionKind::Call);

    let rows = desk.filtered_options("AAPL", &criteria).await?;
    println!("--- {} AAPL calls ---", rows.len());
    for row in rows.iter().take(10) {
        println!(
            "  {} {} strike {:>7.2}  OI {:>7}  vol {:>7}",
            row.expiration,
            row.contract_symbol,
            row.strike,
            row.open_interest.unwrap_or_default(),
            row.volume.unwrap_or_default(),
        );
    }

    // 4. The same scan again is served from the cache.
    let again = desk.filtered_options("AAPL", &criteria).await?;
    println!("cached rerun returned {} rows", again.len());

    Ok(())
}
