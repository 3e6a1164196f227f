//! Class names loaded from the detector's class file.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Class names indexed by detector class id, one per line in the class file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Blank lines are skipped; surrounding whitespace is trimmed.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    pub fn label(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ClassNames {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackError;

    #[test]
    fn test_parse() {
        let names = ClassNames::parse("buoy\n\n  dock \nboat\n");
        assert_eq!(names.len(), 3);
        assert_eq!(names.label(0), Some("buoy"));
        assert_eq!(names.label(1), Some("dock"));
        assert_eq!(names.label(3), None);
    }

    #[test]
    fn test_missing_file() {
        let res = ClassNames::from_path("/nonexistent/classes.txt");
        assert!(matches!(res, Err(TrackError::Io(_))));
    }
}
