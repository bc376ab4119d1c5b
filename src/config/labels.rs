//! Label tables.
//!
//! Labels are loaded once at predictor load time from a line-delimited text
//! resource, one label per line, 0-indexed by line order, and are immutable
//! thereafter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{PredictError, PredictResult};

/// An ordered, index-addressed label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels(Vec<String>);

impl Labels {
    /// Wraps an in-memory label list.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self(lines)
    }

    /// Loads labels from a line-delimited file.
    ///
    /// Lines are kept verbatim (including blank lines), so class index i
    /// always corresponds to line i of the resource.
    pub fn load(path: impl AsRef<Path>) -> PredictResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PredictError::load_with_source(format!("cannot read {}", path.display()), e)
        })?;
        let mut labels = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                PredictError::load_with_source(format!("cannot read {}", path.display()), e)
            })?;
            labels.push(line);
        }
        Ok(Self(labels))
    }

    /// Returns the label at class index `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|s| s.as_str())
    }

    /// Returns the label at class index `index`, or a decode error naming it.
    pub fn get_checked(&self, index: usize) -> PredictResult<&str> {
        self.get(index).ok_or_else(|| {
            PredictError::decode(format!(
                "class index {} out of range for {} labels",
                index,
                self.0.len()
            ))
        })
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the full label list in index order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_preserves_line_order_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "background\n\ncat\ndog").unwrap();

        let labels = Labels::load(file.path()).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.get(0), Some("background"));
        assert_eq!(labels.get(1), Some(""));
        assert_eq!(labels.get(3), Some("dog"));
        assert_eq!(labels.get(4), None);
    }

    #[test]
    fn load_missing_file_is_a_load_error() {
        let err = Labels::load("/nonexistent/labels.txt").unwrap_err();
        assert!(matches!(err, PredictError::Load { .. }));
        assert!(err.to_string().contains("/nonexistent/labels.txt"));
    }

    #[test]
    fn get_checked_names_the_index() {
        let labels = Labels::from_lines(vec!["a".into(), "b".into()]);
        assert_eq!(labels.get_checked(1).unwrap(), "b");
        let err = labels.get_checked(2).unwrap_err();
        assert!(err.to_string().contains("class index 2"));
    }
}
