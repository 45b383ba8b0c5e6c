use std::fmt;

use thiserror::Error;

/// Stage of the per-chunk detrending pass in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetrendStage {
    Normalize,
    MotionAxis,
    Trajectory,
    ArcLength,
    FluxFit,
}

impl fmt::Display for DetrendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetrendStage::Normalize => "flux normalization",
            DetrendStage::MotionAxis => "motion axis estimate",
            DetrendStage::Trajectory => "trajectory fit",
            DetrendStage::ArcLength => "arc-length integration",
            DetrendStage::FluxFit => "flux fit",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SffError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "Input sequences differ in length (time={time}, flux={flux}, centroid_x={centroid_x}, centroid_y={centroid_y})"
    )]
    LengthMismatch {
        time: usize,
        flux: usize,
        centroid_x: usize,
        centroid_y: usize,
    },

    #[error("Numeric degeneracy in chunk {chunk} during {stage}: {reason}")]
    NumericDegeneracy {
        chunk: usize,
        stage: DetrendStage,
        reason: String,
    },

    #[error(
        "Insufficient samples in chunk {chunk} for {stage}: {samples} samples for a degree {degree} fit"
    )]
    InsufficientSamples {
        chunk: usize,
        stage: DetrendStage,
        samples: usize,
        degree: usize,
    },

    #[error(
        "Quadrature did not converge in chunk {chunk} at sample {sample} (upper bound {upper}, error estimate {error_estimate:e} > tolerance {tolerance:e})"
    )]
    IntegrationFailure {
        chunk: usize,
        sample: usize,
        upper: f64,
        error_estimate: f64,
        tolerance: f64,
    },

    #[error("Least-squares system has no usable solution: {0}")]
    SingularFit(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed light curve file: {0}")]
    MalformedLightCurve(String),
}

impl SffError {
    /// Attach a chunk index to an error raised by a chunk-agnostic helper.
    ///
    /// Errors that already carry a chunk index keep their own.
    pub(crate) fn in_chunk(self, chunk: usize) -> Self {
        match self {
            SffError::NumericDegeneracy { stage, reason, .. } => SffError::NumericDegeneracy {
                chunk,
                stage,
                reason,
            },
            SffError::InsufficientSamples {
                stage,
                samples,
                degree,
                ..
            } => SffError::InsufficientSamples {
                chunk,
                stage,
                samples,
                degree,
            },
            SffError::IntegrationFailure {
                sample,
                upper,
                error_estimate,
                tolerance,
                ..
            } => SffError::IntegrationFailure {
                chunk,
                sample,
                upper,
                error_estimate,
                tolerance,
            },
            other => other,
        }
    }
}

impl PartialEq for SffError {
    fn eq(&self, other: &Self) -> bool {
        use SffError::*;
        match (self, other) {
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (
                LengthMismatch {
                    time: t1,
                    flux: f1,
                    centroid_x: x1,
                    centroid_y: y1,
                },
                LengthMismatch {
                    time: t2,
                    flux: f2,
                    centroid_x: x2,
                    centroid_y: y2,
                },
            ) => t1 == t2 && f1 == f2 && x1 == x2 && y1 == y2,
            (
                NumericDegeneracy {
                    chunk: c1,
                    stage: s1,
                    reason: r1,
                },
                NumericDegeneracy {
                    chunk: c2,
                    stage: s2,
                    reason: r2,
                },
            ) => c1 == c2 && s1 == s2 && r1 == r2,
            (
                InsufficientSamples {
                    chunk: c1,
                    stage: s1,
                    samples: n1,
                    degree: d1,
                },
                InsufficientSamples {
                    chunk: c2,
                    stage: s2,
                    samples: n2,
                    degree: d2,
                },
            ) => c1 == c2 && s1 == s2 && n1 == n2 && d1 == d2,
            (
                IntegrationFailure {
                    chunk: c1,
                    sample: i1,
                    ..
                },
                IntegrationFailure {
                    chunk: c2,
                    sample: i2,
                    ..
                },
            ) => c1 == c2 && i1 == i2,
            (SingularFit(a), SingularFit(b)) => a == b,
            (MalformedLightCurve(a), MalformedLightCurve(b)) => a == b,

            // not comparable, same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}

#[cfg(test)]
mod sff_errors_test {
    use super::*;

    #[test]
    fn test_in_chunk_rewrites_index() {
        let err = SffError::NumericDegeneracy {
            chunk: 0,
            stage: DetrendStage::MotionAxis,
            reason: "zero".into(),
        };
        assert_eq!(
            err.in_chunk(4),
            SffError::NumericDegeneracy {
                chunk: 4,
                stage: DetrendStage::MotionAxis,
                reason: "zero".into(),
            }
        );

        let cfg = SffError::InvalidConfiguration("x".into());
        assert_eq!(cfg.in_chunk(3), SffError::InvalidConfiguration("x".into()));
    }

    #[test]
    fn test_display_mentions_stage() {
        let err = SffError::InsufficientSamples {
            chunk: 2,
            stage: DetrendStage::FluxFit,
            samples: 4,
            degree: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("chunk 2"));
        assert!(msg.contains("flux fit"));
    }
}
