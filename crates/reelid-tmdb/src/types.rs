//! Typed subset of the TMDB `search/movie` response.
//!
//! Only the fields the resolver and refiner look at are modelled; everything
//! else in the payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /search/movie`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieResult>,
    #[serde(default)]
    pub total_results: u64,
}

impl SearchResponse {
    /// Catalog ID of the top-ranked result, if any.
    #[must_use]
    pub fn first_id(&self) -> Option<u64> {
        self.results.first().map(|r| r.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MovieResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    /// `YYYY-MM-DD`, or empty for unreleased titles.
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_search_payload_ignoring_extra_fields() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 27205, "title": "Inception", "original_title": "Inception",
                 "release_date": "2010-07-15", "popularity": 83.9, "adult": false,
                 "genre_ids": [28, 878]},
                {"id": 64956, "title": "Inception: The Cobol Job", "release_date": ""}
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.first_id(), Some(27205));
        assert_eq!(resp.results[1].release_date.as_deref(), Some(""));
        assert_eq!(resp.results[1].popularity, None);
    }

    #[test]
    fn missing_results_means_no_match() {
        let resp: SearchResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.first_id(), None);
    }
}
