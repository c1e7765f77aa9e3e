pub mod bars;
pub mod metadata;
pub mod round_trips;
