//! Result types for a completed search: the winning generator and its
//! figure-of-merit value.
//!
//! Per the report-surface decision in the design ledger, output
//! *formatting* beyond `Display` (human form) and [`SearchResult::to_machine_string`]
//! (machine form) — a LaTeX formatter, a CLI — is an external
//! collaborator's job, the same split `tomchaplin-lophat::diagram`
//! draws between `PersistenceDiagram`'s `Display` impl and any report
//! generator built on top of it.

use std::fmt;

/// A single coordinate's winning generating value, rendered by its
/// construction's `format` method.
#[derive(Debug, Clone)]
pub struct CoordinateReport {
    pub coord: usize,
    pub rendered_value: String,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub coordinates: Vec<CoordinateReport>,
    pub merit: f64,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "merit = {:.12e}", self.merit)?;
        for coord in &self.coordinates {
            writeln!(f, "  coord {}: {}", coord.coord, coord.rendered_value)?;
        }
        Ok(())
    }
}

impl SearchResult {
    /// Space-separated machine form: merit first, then one rendered value
    /// per coordinate, one coordinate per line.
    pub fn to_machine_string(&self) -> String {
        let mut out = format!("{:e}\n", self.merit);
        for coord in &self.coordinates {
            out.push_str(&coord.rendered_value);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_merit_and_every_coordinate() {
        let result = SearchResult {
            coordinates: vec![
                CoordinateReport {
                    coord: 0,
                    rendered_value: "110/011".into(),
                },
                CoordinateReport {
                    coord: 1,
                    rendered_value: "101/010".into(),
                },
            ],
            merit: 0.5,
        };
        let text = format!("{result}");
        assert!(text.contains("merit"));
        assert!(text.contains("110/011"));
        assert!(text.contains("101/010"));
    }

    #[test]
    fn machine_string_is_one_coordinate_per_line() {
        let result = SearchResult {
            coordinates: vec![CoordinateReport {
                coord: 0,
                rendered_value: "abc".into(),
            }],
            merit: 1.0,
        };
        let machine_string = result.to_machine_string();
        let lines: Vec<&str> = machine_string.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "abc");
    }
}
