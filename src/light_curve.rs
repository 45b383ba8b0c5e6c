//! # Corrected light curve and its text layout
//!
//! [`CorrectedLightCurve`] is the durable product of a detrending run: one
//! `(time, corrected flux)` pair per input sample, in input order.
//!
//! ## File layout
//! -----------------
//! ```text
//! # Time, Flux
//! 2.000000000000000000e+03 9.998713412335465321e-01
//! 2.000020400000000009e+03 1.000094117301935147e+00
//! ```
//!
//! * one header line starting with `#`,
//! * two space-separated columns in 18-digit scientific notation.
//!
//! The reader skips every `#` line, accepts any amount of whitespace between
//! columns and ignores columns past the second.
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{Flux, Time},
    sff_errors::SffError,
};

/// Header line written above the data
pub const LIGHT_CURVE_HEADER: &str = "# Time, Flux";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrectedLightCurve {
    pub time: Vec<Time>,
    pub flux: Vec<Flux>,
}

/// One row of the text layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightCurveRow {
    pub time: Time,
    pub flux: Flux,
}

/// Format like C's `%.18e`: mantissa with 18 decimals, signed exponent of at least two digits.
fn sci18(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let s = format!("{v:.18e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

impl CorrectedLightCurve {
    pub fn new(time: Vec<Time>, flux: Vec<Flux>) -> Result<Self, SffError> {
        if time.len() != flux.len() {
            return Err(SffError::LengthMismatch {
                time: time.len(),
                flux: flux.len(),
                centroid_x: time.len(),
                centroid_y: time.len(),
            });
        }
        Ok(CorrectedLightCurve { time, flux })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = LightCurveRow> + '_ {
        self.time
            .iter()
            .zip(&self.flux)
            .map(|(&time, &flux)| LightCurveRow { time, flux })
    }

    pub fn into_parts(self) -> (Vec<Time>, Vec<Flux>) {
        (self.time, self.flux)
    }

    /// Write the two-column layout to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), SffError> {
        writeln!(writer, "{LIGHT_CURVE_HEADER}")?;
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(writer);
        for row in self.rows() {
            csv_writer.write_record([sci18(row.time), sci18(row.flux)])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the two-column layout to `path`, replacing any existing file.
    pub fn write_text<P: AsRef<Path>>(&self, path: P) -> Result<(), SffError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Parse the two-column layout from any reader.
    ///
    /// Return
    /// ----------
    /// * The light curve in file order.
    /// * [`SffError::MalformedLightCurve`] for a data line with fewer than two columns.
    /// * [`SffError::CsvError`] for a value that is not a number.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, SffError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut out = CorrectedLightCurve::default();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let fields: csv::StringRecord = record.iter().filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 2 {
                return Err(SffError::MalformedLightCurve(format!(
                    "data record {} has {} column(s), expected 2",
                    line + 1,
                    fields.len()
                )));
            }
            let pair: csv::StringRecord = fields.iter().take(2).collect();
            let row: LightCurveRow = pair.deserialize(None)?;
            out.time.push(row.time);
            out.flux.push(row.flux);
        }
        Ok(out)
    }

    pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Self, SffError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

#[cfg(test)]
mod light_curve_test {
    use super::*;

    #[test]
    fn test_sci18_layout() {
        assert_eq!(sci18(1.0), "1.000000000000000000e+00");
        assert_eq!(sci18(-2.5e-7), "-2.499999999999999887e-07");
        assert_eq!(sci18(-2.5e-1), "-2.500000000000000000e-01");
        assert_eq!(sci18(2345.5), "2.345500000000000000e+03");
        assert_eq!(sci18(1e120), "1.000000000000000000e+120");
    }

    #[test]
    fn test_write_layout() {
        let lc = CorrectedLightCurve::new(vec![2000.0, 2000.5], vec![1.0, 0.99]).unwrap();
        let mut buf = Vec::new();
        lc.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Time, Flux");
        assert_eq!(lines[1], "2.000000000000000000e+03 1.000000000000000000e+00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_read_tolerates_whitespace_and_extra_columns() {
        let text = "# Time, Flux\n1.5   0.75\n# note\n2.5 1.25 9.0\n";
        let lc = CorrectedLightCurve::read_from(text.as_bytes()).unwrap();
        assert_eq!(lc.time, vec![1.5, 2.5]);
        assert_eq!(lc.flux, vec![0.75, 1.25]);
    }

    #[test]
    fn test_read_rejects_single_column() {
        let err = CorrectedLightCurve::read_from("# h\n1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SffError::MalformedLightCurve(_)));
    }

    #[test]
    fn test_read_rejects_non_numeric() {
        let err = CorrectedLightCurve::read_from("abc 1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SffError::CsvError(_)));
    }

    #[test]
    fn test_new_checks_lengths() {
        assert!(CorrectedLightCurve::new(vec![1.0], vec![]).is_err());
    }
}
