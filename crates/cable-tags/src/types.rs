use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("Missing columns: {missing:?}. Found: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
    #[error("Invalid quantity {value:?} in row {row}, using 1")]
    InvalidQuantity { row: usize, value: String },
    #[error("Output path {} is not writable: {source}", path.display())]
    OutputPathUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Build failed: {0}")]
    BuildFailed(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("No tags to print")]
    NoTags,
    #[error("Total tag count does not fit in memory")]
    TooManyTags,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TagError>;

/// One source row after column resolution, before quantity expansion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRow {
    pub system: String,
    pub track: String,
    pub cable: String,
    pub length: String,
    pub quantity: usize,
}

/// One physical tag to print
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagRecord {
    pub system: String,
    pub track: String,
    pub cable: String,
    pub length: String,
}

impl From<&SourceRow> for TagRecord {
    fn from(row: &SourceRow) -> Self {
        Self {
            system: row.system.clone(),
            track: row.track.clone(),
            cable: row.cable.clone(),
            length: row.length.clone(),
        }
    }
}

/// Replicate every row by its quantity, keeping source order
pub fn expand_rows(rows: &[SourceRow]) -> Vec<TagRecord> {
    rows.iter()
        .flat_map(|row| std::iter::repeat_n(TagRecord::from(row), row.quantity.max(1)))
        .collect()
}

/// Which physical side of the printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Printed first; carries system and track
    Front,
    /// Printed after the duplex flip; carries cable and length
    Back,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

/// Orientation of a triangle on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Apex up, base at the bottom of the row band
    Upright,
    /// Apex down, base at the top of the row band
    Inverted,
}

impl Orientation {
    /// Columns alternate, starting upright at column 0
    pub fn for_column(col: usize) -> Self {
        if col % 2 == 1 {
            Orientation::Inverted
        } else {
            Orientation::Upright
        }
    }

    pub fn is_inverted(self) -> bool {
        self == Orientation::Inverted
    }
}

/// Position of a tag on a page grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column on the front side)
    pub col: usize,
    pub orientation: Orientation,
    pub side: Side,
}

/// Progress signal: one unit per rendered page side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    pub sides_done: usize,
    pub sides_total: usize,
}

/// Summary of a planned document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStatistics {
    pub source_rows: usize,
    pub tag_instances: usize,
    pub tags_per_page: usize,
    pub page_pairs: usize,
    pub output_pages: usize,
    pub free_slots_on_last_page: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(system: &str, quantity: usize) -> SourceRow {
        SourceRow {
            system: system.to_string(),
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_rows_replicates_by_quantity() {
        let rows = vec![row("A", 3), row("B", 1), row("C", 2)];
        let tags = expand_rows(&rows);

        assert_eq!(tags.len(), 6);
        let systems: Vec<&str> = tags.iter().map(|t| t.system.as_str()).collect();
        assert_eq!(systems, vec!["A", "A", "A", "B", "C", "C"]);
    }

    #[test]
    fn test_expand_rows_zero_quantity_counts_as_one() {
        let tags = expand_rows(&[row("A", 0)]);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_orientation_alternates_by_column() {
        assert_eq!(Orientation::for_column(0), Orientation::Upright);
        assert_eq!(Orientation::for_column(1), Orientation::Inverted);
        assert_eq!(Orientation::for_column(2), Orientation::Upright);
        assert_eq!(Orientation::for_column(3), Orientation::Inverted);
        assert_eq!(Orientation::for_column(4), Orientation::Upright);
    }
}
