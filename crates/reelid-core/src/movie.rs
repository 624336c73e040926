use serde::Serialize;

/// One film as extracted from a listing page, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub title: String,
    pub year: Option<u16>,
    pub source_url: String,
}

/// One watchlist entry, carried through a single pipeline run.
///
/// `catalog_id` starts absent and can only ever move from absent to present
/// via [`MovieRecord::record_catalog_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub year: Option<u16>,
    pub source_url: String,
    catalog_id: Option<u64>,
}

impl MovieRecord {
    #[must_use]
    pub fn new(title: impl Into<String>, year: Option<u16>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year,
            source_url: source_url.into(),
            catalog_id: None,
        }
    }

    #[must_use]
    pub fn catalog_id(&self) -> Option<u64> {
        self.catalog_id
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.catalog_id.is_some()
    }

    /// Stores the resolved catalog identifier.
    ///
    /// Returns `false` without touching the record when an identifier is
    /// already present, or when `id` is zero (catalog ids are positive).
    pub fn record_catalog_id(&mut self, id: u64) -> bool {
        if self.catalog_id.is_some() || id == 0 {
            return false;
        }
        self.catalog_id = Some(id);
        true
    }

    /// `"Title (Year)"`, or just the title when the year is unknown.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        }
    }
}

impl From<PartialRecord> for MovieRecord {
    fn from(partial: PartialRecord) -> Self {
        Self::new(partial.title, partial.year, partial.source_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> MovieRecord {
        MovieRecord::new(
            "Inception",
            Some(2010),
            "https://letterboxd.com/film/inception/",
        )
    }

    #[test]
    fn new_record_starts_unresolved() {
        let record = inception();
        assert!(record.catalog_id().is_none());
        assert!(!record.is_resolved());
    }

    #[test]
    fn record_catalog_id_writes_once() {
        let mut record = inception();
        assert!(record.record_catalog_id(27205));
        assert_eq!(record.catalog_id(), Some(27205));

        assert!(!record.record_catalog_id(1), "second write must be rejected");
        assert_eq!(record.catalog_id(), Some(27205));
    }

    #[test]
    fn record_catalog_id_rejects_zero() {
        let mut record = inception();
        assert!(!record.record_catalog_id(0));
        assert!(record.catalog_id().is_none());
    }

    #[test]
    fn display_name_includes_year_when_known() {
        assert_eq!(inception().display_name(), "Inception (2010)");
        let no_year = MovieRecord::new("Untitled", None, "https://letterboxd.com/film/untitled/");
        assert_eq!(no_year.display_name(), "Untitled");
    }

    #[test]
    fn from_partial_record_copies_fields() {
        let record = MovieRecord::from(PartialRecord {
            title: "Heat".to_owned(),
            year: Some(1995),
            source_url: "https://letterboxd.com/film/heat-1995/".to_owned(),
        });
        assert_eq!(record.title, "Heat");
        assert_eq!(record.year, Some(1995));
        assert!(record.catalog_id().is_none());
    }
}
