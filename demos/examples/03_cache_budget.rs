use candela::{CacheConfig, Candela, ChartQuery, SeriesKey};
use candela_demos::common::{campaign, get_source};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let candela = Candela::builder()
        .source(get_source())
        .cache(CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        })
        .build()?;
    let campaign = campaign();
    let meta = candela.load_metadata(&campaign).await?;
    // drop the bounds placeholders so eviction is visible
    candela.clear_cache().await;

    for asset in meta.asset_info.keys() {
        for tf in ["15m", "1h", "1D"] {
            let series = SeriesKey::new(&campaign, asset, tf);
            let data = candela.load(&ChartQuery::new(series.clone())).await?;
            let stats = candela.cache_stats().await;
            println!(
                "{series}: {} rows, cache holds {} series ({} bytes)",
                data.table.len(),
                stats.total_entries,
                stats.total_bytes
            );
        }
    }

    candela.clear_strategy_cache(&campaign).await;
    println!("after clear: {:?}", candela.cache_stats().await);
    Ok(())
}
