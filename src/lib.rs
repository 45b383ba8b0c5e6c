//! # k2sff
//!
//! Centroid-motion detrending of space-telescope light curves.
//!
//! Small pointing drifts move a star across detector pixels with uneven
//! sensitivity, imprinting a systematic trend on the measured flux. This crate
//! models that trend as a function of the star's position along its drift path
//! (arc length) and divides it out, chunk by chunk.
//!
//! ```rust,no_run
//! use k2sff::{detrend_with_params, SffParams, TimeSeries};
//!
//! # fn demo(t: Vec<f64>, f: Vec<f64>, x: Vec<f64>, y: Vec<f64>) -> Result<(), k2sff::SffError> {
//! let series = TimeSeries::new(t, f, x, y)?.skip_leading(k2sff::constants::DEFAULT_LEADING_SKIP);
//! let params = SffParams::builder().chunksize(300).build()?;
//! let out = detrend_with_params(&series, &params)?;
//! out.light_curve.write_text("centroiddetrended_lightcurve.txt")?;
//! # Ok(()) }
//! ```
pub mod constants;
pub mod detrend;
pub mod eigen2;
pub mod light_curve;
pub mod polynomial;
pub mod quadrature;
pub mod sff_errors;
pub mod stats;
pub mod time_series;

pub use detrend::pipeline::{
    detrend, detrend_segments, detrend_with_params, ChunkReport, ChunkResult, DetrendOutput,
};
pub use detrend::SffParams;
pub use light_curve::CorrectedLightCurve;
pub use sff_errors::{DetrendStage, SffError};
pub use time_series::TimeSeries;
