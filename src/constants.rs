//! # Constants and type definitions for k2sff
//!
//! This module centralizes the **default parameters**, **numeric constants**, and
//! **common type aliases** used by the centroid-motion detrending engine.
//!
//! ## Overview
//!
//! - Default chunking and polynomial settings
//! - Centroid offset applied before the principal-axis estimate
//! - Quadrature tolerances used for the arc-length integration
//! - Type aliases for the quantities flowing through the pipeline

// -------------------------------------------------------------------------------------------------
// Detrending defaults
// -------------------------------------------------------------------------------------------------

/// Default number of samples per temporal chunk
pub const DEFAULT_CHUNKSIZE: usize = 200;

/// Default degree of the trajectory and flux polynomials
pub const DEFAULT_POLY_DEGREE: usize = 5;

/// Constant added to the median-centered centroids before the covariance estimate.
///
/// Keeps the centered cloud away from the origin. Changing it changes the output.
pub const CENTROID_BIAS: f64 = 1.5;

/// A trailing chunk shorter than `chunksize / MIN_TAIL_DIVISOR` is merged into its predecessor
pub const MIN_TAIL_DIVISOR: f64 = 2.5;

/// Number of leading samples the raw photometry pipeline discards before detrending
pub const DEFAULT_LEADING_SKIP: usize = 90;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Absolute error tolerance for the arc-length quadrature
pub const QUAD_EPSABS: f64 = 1e-5;

/// Relative error tolerance for the arc-length quadrature
pub const QUAD_EPSREL: f64 = 1.49e-8;

/// Maximum number of subintervals the adaptive quadrature may create per integral
pub const QUAD_LIMIT: usize = 50;

/// Threshold under which a unit eigenvector component is treated as zero
pub const AXIS_EPS: f64 = 1e-12;

/// 2π
pub const DPI: f64 = 2. * std::f64::consts::PI;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Observation epoch (days)
pub type Time = f64;

/// Flux, raw counts or normalized depending on the stage
pub type Flux = f64;

/// Detector pixel coordinate
pub type Pixel = f64;

/// Angle in radians
pub type Radian = f64;

/// Arc length along the fitted drift trajectory (pixels)
pub type ArcLength = f64;
