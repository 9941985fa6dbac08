// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Two-column CSV series.
//!
//! The loaded file is kept as raw lines so that toggling the header option
//! re-parses without touching the disk again.

/// Key/value pairs plotted against each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    keys: Vec<f64>,
    values: Vec<f64>,
}

/// Labels taken from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    pub x: String,
    pub y: String,
}

/// A borrowed slice of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesWindow<'a> {
    pub keys: &'a [f64],
    pub values: &'a [f64],
}

impl SeriesWindow<'_> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over `(key, value)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }
}

impl Series {
    /// Build a series from parallel sequences, truncating to the shorter one.
    pub fn from_pairs(mut keys: Vec<f64>, mut values: Vec<f64>) -> Self {
        let len = keys.len().min(values.len());
        keys.truncate(len);
        values.truncate(len);
        Self { keys, values }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Slice `len` samples starting at `offset`.
    ///
    /// An offset past the end yields an empty window. A negative offset
    /// starts at zero and shortens the window by the overshoot.
    pub fn window(&self, offset: i64, len: usize) -> SeriesWindow<'_> {
        let total = self.keys.len();
        let (start, len) = if offset < 0 {
            let shortened = (len as i64 + offset).max(0) as usize;
            (0, shortened)
        } else {
            (offset as usize, len)
        };

        if start >= total {
            return SeriesWindow {
                keys: &[],
                values: &[],
            };
        }

        let end = start.saturating_add(len).min(total);
        SeriesWindow {
            keys: &self.keys[start..end],
            values: &self.values[start..end],
        }
    }
}

/// Raw lines of a loaded CSV file.
#[derive(Debug, Clone, Default)]
pub struct RawCsv {
    lines: Vec<String>,
}

impl RawCsv {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_owned).collect(),
        }
    }

    /// Parse the lines into a series, optionally treating the first line as
    /// a header.
    pub fn parse(&self, has_headers: bool) -> (Series, Option<HeaderLabels>) {
        let mut labels = None;
        let data_lines = if has_headers {
            if let Some(first) = self.lines.first() {
                let fields: Vec<&str> = first.split(',').collect();
                if fields.len() >= 2 {
                    labels = Some(HeaderLabels {
                        x: fields[0].trim().to_string(),
                        y: fields[1].trim().to_string(),
                    });
                }
            }
            self.lines.get(1..).unwrap_or(&[])
        } else {
            &self.lines[..]
        };

        let mut keys = Vec::with_capacity(data_lines.len());
        let mut values = Vec::with_capacity(data_lines.len());
        for line in data_lines {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() >= 2 {
                keys.push(parse_field(fields[0]));
                values.push(parse_field(fields[1]));
            }
        }

        (Series { keys, values }, labels)
    }
}

/// Unparsable numbers count as zero.
fn parse_field(field: &str) -> f64 {
    field.trim().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_HEADER: &str = "time, speed\n0,1.5\n1,2.5\n2,3.5\n";

    #[test]
    fn test_header_populates_labels() {
        let raw = RawCsv::new(WITH_HEADER);
        let (series, labels) = raw.parse(true);

        let labels = labels.expect("header labels");
        assert_eq!(labels.x, "time");
        assert_eq!(labels.y, "speed");
        assert_eq!(series.len(), 3);
        assert_eq!(series.keys(), &[0.0, 1.0, 2.0]);
        assert_eq!(series.values(), &[1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_without_header_every_line_is_data() {
        let raw = RawCsv::new(WITH_HEADER);
        let (series, labels) = raw.parse(false);

        assert!(labels.is_none());
        // Header row parses as zeros.
        assert_eq!(series.len(), 4);
        assert_eq!(series.keys()[0], 0.0);
        assert_eq!(series.values()[0], 0.0);
        assert_eq!(series.values()[1], 1.5);
    }

    #[test]
    fn test_short_lines_skipped_and_crlf_trimmed() {
        let raw = RawCsv::new("1,10\r\nnot a pair\r\n\r\n2,20\r\n");
        let (series, _) = raw.parse(false);

        assert_eq!(series.keys(), &[1.0, 2.0]);
        assert_eq!(series.values(), &[10.0, 20.0]);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let raw = RawCsv::new("1,2,3\n4,5,6");
        let (series, _) = raw.parse(false);
        assert_eq!(series.keys(), &[1.0, 4.0]);
        assert_eq!(series.values(), &[2.0, 5.0]);
    }

    #[test]
    fn test_window_inside_and_past_end() {
        let series = Series::from_pairs((0..10).map(f64::from).collect(), vec![1.0; 10]);

        let w = series.window(2, 3);
        assert_eq!(w.keys, &[2.0, 3.0, 4.0]);

        let tail = series.window(8, 5);
        assert_eq!(tail.keys, &[8.0, 9.0]);

        assert!(series.window(10, 3).is_empty());
        assert!(series.window(50, 3).is_empty());
    }

    #[test]
    fn test_window_negative_offset() {
        let series = Series::from_pairs((0..10).map(f64::from).collect(), vec![0.0; 10]);

        let w = series.window(-2, 5);
        assert_eq!(w.keys, &[0.0, 1.0, 2.0]);

        assert!(series.window(-5, 3).is_empty());
    }

    #[test]
    fn test_from_pairs_keeps_lengths_equal() {
        let series = Series::from_pairs(vec![1.0, 2.0, 3.0], vec![4.0]);
        assert_eq!(series.keys().len(), series.values().len());
        assert_eq!(series.len(), 1);
    }
}
