//! National Crosswalk Module
//! The national table restricted to analytically meaningful occupation rows.

use crate::data::{ObservationRow, OewsTable};
use crate::soc;

/// Occupation groups kept in the crosswalk.
pub const CROSSWALK_GROUPS: [&str; 3] = ["detailed", "broad", "total"];

/// Lookup backbone for titles, national wage statistics and ranking.
#[derive(Debug, Clone, Default)]
pub struct Crosswalk {
    rows: Vec<ObservationRow>,
}

impl Crosswalk {
    /// Build from the national table.
    ///
    /// Rows need a canonical code. When the table carries an `O_GROUP` column
    /// only detailed, broad and total rows are kept.
    pub fn from_national(table: &OewsTable) -> Self {
        let filter_groups = table.has_column("O_GROUP");
        let rows = table
            .rows()
            .iter()
            .filter(|r| r.soc_canonical.is_some())
            .filter(|r| !filter_groups || r.o_group.as_deref().is_some_and(is_crosswalk_group))
            .cloned()
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for an occupation code, in any accepted spelling.
    pub fn find(&self, code: &str) -> Option<&ObservationRow> {
        let code = soc::canonical(code);
        self.rows.iter().find(|r| r.has_code(&code))
    }

    /// The all-occupations aggregate row.
    pub fn all_occupations(&self) -> Option<&ObservationRow> {
        self.rows.iter().find(|r| r.is_all_occupations())
    }

    /// Individual occupations, without the aggregate row.
    pub fn occupations(&self) -> impl Iterator<Item = &ObservationRow> {
        self.rows.iter().filter(|r| !r.is_all_occupations())
    }
}

fn is_crosswalk_group(group: &str) -> bool {
    CROSSWALK_GROUPS
        .iter()
        .any(|g| g.eq_ignore_ascii_case(group.trim()))
}
