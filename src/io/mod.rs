/// CSV export of the yearly projection.
pub mod export;
