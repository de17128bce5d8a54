//! Field Matcher
//!
//! Walks a profile's strategies in order and returns the first candidate
//! that survives normalization and validation. A strategy that finds
//! nothing, or whose query fails, is an expected outcome: the matcher moves
//! on to the next one and the field resolves empty if none match.

use crate::document::{Document, Query};
use crate::error::QueryError;
use crate::profiles::{self, FieldProfile, Source, Strategy};
use crate::types::{Field, FieldValues, Region};
use tracing::{debug, info};

/// Result of running one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// First validated, normalized candidate
    Found(String),
    /// Query ran but no candidate validated
    NoMatch { candidates: usize },
    /// Dependent strategy whose anchor field is unresolved
    Skipped,
    /// Query could not be evaluated
    Failed(QueryError),
}

/// Result of running a whole profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { value: String, strategy: &'static str },
    NoMatch,
}

impl Resolution {
    /// Matched value, or the empty string
    pub fn into_value(self) -> String {
        match self {
            Resolution::Matched { value, .. } => value,
            Resolution::NoMatch => String::new(),
        }
    }
}

/// Run a single strategy. `resolved` feeds dependent strategies.
pub fn try_strategy<D: Document + ?Sized>(
    doc: &D,
    profile: &FieldProfile,
    strategy: &Strategy,
    resolved: &FieldValues,
) -> StrategyOutcome {
    let query = match &strategy.source {
        Source::Query(query) => query.clone(),
        Source::NearField(anchor) => match resolved.get(anchor) {
            Some(value) if !value.is_empty() => Query::Near(value.clone()),
            _ => return StrategyOutcome::Skipped,
        },
    };

    let candidates = match doc.query(&query) {
        Ok(candidates) => candidates,
        Err(e) => return StrategyOutcome::Failed(e),
    };

    let count = candidates.len();
    candidates
        .iter()
        .map(|text| (profile.normalize)(text))
        .find(|value| !value.is_empty() && (profile.validate)(value))
        .map_or(StrategyOutcome::NoMatch { candidates: count }, StrategyOutcome::Found)
}

/// Resolve one field against the document.
pub fn resolve_detailed<D: Document + ?Sized>(
    doc: &D,
    profile: &FieldProfile,
    resolved: &FieldValues,
) -> Resolution {
    for strategy in &profile.strategies {
        match try_strategy(doc, profile, strategy, resolved) {
            StrategyOutcome::Found(value) => {
                info!("Found {}: {} (via {})", profile.field, value, strategy.name);
                return Resolution::Matched { value, strategy: strategy.name };
            }
            StrategyOutcome::NoMatch { candidates } => {
                debug!(
                    "{} strategy '{}' had {} candidates, none valid",
                    profile.field, strategy.name, candidates
                );
            }
            StrategyOutcome::Skipped => {
                debug!("{} strategy '{}' skipped: anchor unresolved", profile.field, strategy.name);
            }
            StrategyOutcome::Failed(e) => {
                debug!("{} strategy '{}' failed: {}", profile.field, strategy.name, e);
            }
        }
    }
    Resolution::NoMatch
}

/// Resolve one field; empty string when nothing validates.
pub fn resolve<D: Document + ?Sized>(doc: &D, profile: &FieldProfile, resolved: &FieldValues) -> String {
    resolve_detailed(doc, profile, resolved).into_value()
}

/// Resolve every profile of a region, in profile order. Earlier matches are
/// visible to later dependent strategies.
pub fn resolve_region<D: Document + ?Sized>(doc: &D, region: Region) -> Vec<(Field, Resolution)> {
    let mut found = FieldValues::new();
    let mut resolutions = Vec::new();
    for profile in profiles::for_region(region) {
        let resolution = resolve_detailed(doc, profile, &found);
        if let Resolution::Matched { value, .. } = &resolution {
            found.insert(profile.field, value.clone());
        }
        resolutions.push((profile.field, resolution));
    }
    resolutions
}

/// Resolved fields of a region; unresolved ones are absent.
pub fn extract_region<D: Document + ?Sized>(doc: &D, region: Region) -> FieldValues {
    resolve_region(doc, region)
        .into_iter()
        .filter_map(|(field, resolution)| match resolution {
            Resolution::Matched { value, .. } => Some((field, value)),
            Resolution::NoMatch => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;
    use std::collections::HashMap;

    /// Canned answers per query; unknown queries return no candidates.
    #[derive(Default)]
    struct FakeDocument {
        answers: HashMap<Query, Result<Vec<String>, QueryError>>,
        title: String,
    }

    impl FakeDocument {
        fn answer(mut self, query: Query, texts: &[&str]) -> Self {
            self.answers
                .insert(query, Ok(texts.iter().map(|t| t.to_string()).collect()));
            self
        }

        fn fail(mut self, query: Query) -> Self {
            self.answers
                .insert(query, Err(QueryError::EmptyAnchor));
            self
        }
    }

    impl Document for FakeDocument {
        fn query(&self, query: &Query) -> Result<Vec<String>, QueryError> {
            self.answers.get(query).cloned().unwrap_or_else(|| Ok(vec![]))
        }

        fn title(&self) -> &str {
            &self.title
        }
    }

    fn profile(field: Field) -> &'static FieldProfile {
        profiles::get(field).unwrap()
    }

    #[test]
    fn test_second_strategy_wins_when_first_invalid() {
        let p = profile(Field::ProjectName);
        let doc = FakeDocument::default()
            .answer(Query::LabelNextSibling("Project Name"), &["Project Overview Details"])
            .answer(Query::LabelParentNextSibling("Project Name"), &["  Sunrise   Heights "]);

        assert_eq!(
            resolve_detailed(&doc, p, &FieldValues::new()),
            Resolution::Matched {
                value: "Sunrise Heights".to_string(),
                strategy: "label-parent-sibling"
            }
        );
    }

    #[test]
    fn test_first_validated_strategy_stops_the_walk() {
        let p = profile(Field::ProjectName);
        let doc = FakeDocument::default()
            .answer(Query::LabelNextSibling("Project Name"), &["Green Valley"])
            .answer(Query::Css("h1"), &["Blue Lagoon"]);
        assert_eq!(resolve(&doc, p, &FieldValues::new()), "Green Valley");
    }

    #[test]
    fn test_no_valid_candidate_resolves_empty() {
        let p = profile(Field::ProjectName);
        let doc = FakeDocument::default()
            .answer(Query::LabelNextSibling("Project Name"), &["Details", "RERA"])
            .answer(Query::Css("h1"), &["Projects"]);
        assert_eq!(resolve(&doc, p, &FieldValues::new()), "");
    }

    #[test]
    fn test_failed_query_falls_through() {
        let p = profile(Field::ReraRegdNo);
        let doc = FakeDocument::default()
            .fail(Query::LabelNextSibling("RERA Regd"))
            .answer(Query::LabelNextSibling("Registration"), &["No: RP/5/2021/1234"]);

        let first = &p.strategies[1];
        assert!(matches!(
            try_strategy(&doc, p, first, &FieldValues::new()),
            StrategyOutcome::Failed(_)
        ));
        assert_eq!(resolve(&doc, p, &FieldValues::new()), "RP/5/2021/1234");
    }

    #[test]
    fn test_dependent_strategy_skipped_without_anchor() {
        let p = profile(Field::ProjectName);
        let near = p
            .strategies
            .iter()
            .find(|s| matches!(s.source, Source::NearField(_)))
            .unwrap();
        let doc = FakeDocument::default();
        assert_eq!(try_strategy(&doc, p, near, &FieldValues::new()), StrategyOutcome::Skipped);

        let mut resolved = FieldValues::new();
        resolved.insert(Field::ReraRegdNo, "RP/5/2021/1234".to_string());
        let doc = doc.answer(Query::Near("RP/5/2021/1234".to_string()), &["Lotus Enclave"]);
        assert_eq!(
            try_strategy(&doc, p, near, &resolved),
            StrategyOutcome::Found("Lotus Enclave".to_string())
        );
    }

    #[test]
    fn test_extract_overview_uses_rera_vicinity() {
        let doc = HtmlDocument::parse(
            r#"<html><head><title>Project Details</title></head><body>
                <h1>Project Details</h1>
                <div class="summary"><span>RP/7/2022/00321</span><span>Lotus Enclave</span></div>
            </body></html>"#,
        );
        let fields = extract_region(&doc, Region::Overview);
        assert_eq!(fields.get(&Field::ReraRegdNo).map(String::as_str), Some("RP/7/2022/00321"));
        assert_eq!(fields.get(&Field::ProjectName).map(String::as_str), Some("Lotus Enclave"));
    }

    #[test]
    fn test_extract_promoter_region() {
        let doc = HtmlDocument::parse(
            r#"<table>
                <tr><td>Company Name</td><td>M/S KALINGA BUILDERS PVT LTD</td></tr>
                <tr><td>Registered Office Address</td><td>Plot No-45, Jaydev Vihar, Dist. Khordha, PIN-751013</td></tr>
                <tr><td>GST No</td><td>21 AAACK 1234 F1Z5</td></tr>
            </table>"#,
        );
        let fields = extract_region(&doc, Region::PromoterTab);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[&Field::PromoterName], "M/S KALINGA BUILDERS PVT LTD");
        assert_eq!(
            fields[&Field::PromoterAddress],
            "Plot No-45, Jaydev Vihar, Dist. Khordha, PIN-751013"
        );
        assert_eq!(fields[&Field::GstNo], "21AAACK1234F1Z5");
    }

    #[test]
    fn test_address_found_past_unrelated_sibling() {
        let doc = HtmlDocument::parse(
            "<div><span>Address</span><span>Permanent</span><span>Plot 5, Cuttack Road, Dist Cuttack</span></div>",
        );
        let fields = extract_region(&doc, Region::PromoterTab);
        assert_eq!(
            fields.get(&Field::PromoterAddress).map(String::as_str),
            Some("Plot 5, Cuttack Road, Dist Cuttack")
        );
    }

    #[test]
    fn test_resolve_region_reports_every_field_in_order() {
        let doc = HtmlDocument::parse(
            r#"<table><tr><td>GST No</td><td>21AAACK1234F1Z5</td></tr></table>"#,
        );
        let resolutions = resolve_region(&doc, Region::PromoterTab);
        let fields: Vec<Field> = resolutions.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec![Field::PromoterName, Field::PromoterAddress, Field::GstNo]);
        assert_eq!(resolutions[0].1, Resolution::NoMatch);
        assert_eq!(
            resolutions[2].1,
            Resolution::Matched { value: "21AAACK1234F1Z5".to_string(), strategy: "gst-no-label" }
        );
    }
}
