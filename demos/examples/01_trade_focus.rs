use candela::{Candela, ChartQuery, PaddingConfig, SeriesKey, TradeWindow, format_for_transport};
use candela_demos::common::{campaign, fmt_ms, fmt_window, get_source};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let candela = Candela::builder()
        .source(get_source())
        .padding(PaddingConfig::CONSERVATIVE)
        .build()?;
    let campaign = campaign();

    let trips = candela.round_trips(&campaign).await?;
    println!("{} round trips", trips.len());
    let Some(asset) = trips.first().map(|t| t.asset_id.clone()) else {
        return Ok(());
    };

    let windows: Vec<TradeWindow> = trips
        .iter()
        .filter(|t| t.asset_id == asset)
        .filter_map(|t| t.window().ok())
        .take(2)
        .collect();
    for w in &windows {
        println!("  selected {}", fmt_window(w));
    }

    let query = ChartQuery::new(SeriesKey::new(&campaign, &asset, "1h")).with_trades(windows);
    let params = format_for_transport(&query.plan(&candela.config().padding));
    println!("request: {params:?}");

    let data = candela.load(&query).await?;
    if let Some(span) = data.table.span() {
        println!(
            "{} bars from {} to {}",
            data.table.len(),
            fmt_ms(span.from),
            fmt_ms(span.to)
        );
    }
    Ok(())
}
