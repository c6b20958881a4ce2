pub mod alerts;
pub mod instrument;

pub use instrument::Instrument;
