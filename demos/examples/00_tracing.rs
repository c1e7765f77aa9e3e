use candela::{Candela, ChartQuery, SeriesKey};
use candela_demos::common::{campaign, get_source};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,candela=trace,candela_http=trace
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let candela = Candela::builder().source(get_source()).build()?;
    let campaign = campaign();

    let meta = candela.load_metadata(&campaign).await?;
    let Some(asset) = meta.asset_info.keys().next().cloned() else {
        println!("campaign {campaign} has no assets");
        return Ok(());
    };

    let series = SeriesKey::new(&campaign, asset, "1h");
    let first = candela.load(&ChartQuery::new(series.clone())).await?;
    let again = candela.load(&ChartQuery::new(series)).await?;
    println!(
        "rows={} first_from_network={} second_from_network={}",
        first.table.len(),
        first.from_network,
        again.from_network
    );
    Ok(())
}
