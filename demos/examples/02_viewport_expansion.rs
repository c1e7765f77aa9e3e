use candela::{Candela, ChartQuery, SeriesKey, Trigger, ViewportDecision, ViewportEvent};
use candela_demos::common::{campaign, fmt_ms, get_source};

const HOUR: i64 = 3_600_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let candela = Candela::builder().source(get_source()).build()?;
    let campaign = campaign();
    candela.load_metadata(&campaign).await?;

    let trips = candela.round_trips(&campaign).await?;
    let Some(trip) = trips.first() else {
        return Ok(());
    };
    let series = SeriesKey::new(&campaign, &trip.asset_id, "1h");
    let window = trip.window()?;
    candela
        .load(&ChartQuery::new(series.clone()).with_trades([window]))
        .await?;

    let mut vp = candela.viewport_controller();
    let center = window.open;
    let events = [
        ViewportEvent::new(center - 24 * HOUR, center + 24 * HOUR, Trigger::from_chart_trigger("zoom")),
        ViewportEvent::new(center - 12 * HOUR, center + 12 * HOUR, Trigger::from_chart_trigger("mousewheel")),
        ViewportEvent::new(center - 96 * HOUR, center + 96 * HOUR, Trigger::from_chart_trigger("zoom")),
        ViewportEvent::new(center + 60 * HOUR, center + 252 * HOUR, Trigger::from_chart_trigger("pan")),
        ViewportEvent::new(center, center + HOUR, Trigger::from_chart_trigger("setExtremes")),
    ];

    for event in &events {
        let out = candela.on_viewport_change(&series, &mut vp, event).await?;
        let label = match out.decision {
            ViewportDecision::Expand(r) => format!("expand {} .. {}", fmt_ms(r.from), fmt_ms(r.to)),
            other => format!("{other:?}"),
        };
        println!(
            "[{} .. {}] {:?}: {label}",
            fmt_ms(event.min),
            fmt_ms(event.max),
            event.trigger
        );
    }

    for r in candela.loaded_ranges(&series).await {
        println!("loaded {r}");
    }
    Ok(())
}
