//! chart-autodetect: streaming chart detection and aggregation.
//!
//! Feed query result rows into a [`ChartProcessor`] one at a time. The
//! processor infers column types, proposes charts when no definitions are
//! supplied, aggregates rows into bounded bucket series and finalizes them
//! into render-ready charts. Rendering is left to the host.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{ChartProcessor, ChartProcessorConfig, ChartProcessorOutput};
pub use error::{ChartError, ChartFault, ChartResult};
