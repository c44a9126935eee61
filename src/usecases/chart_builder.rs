//! Chart builders: (period, events) -> chart option document + data table.
//!
//! Builders are an enum resolved from one `(family, subtype)` lookup table. Every builder
//! aggregates minutes per grouping key and emits rows sorted by descending duration.

use crate::domain::{DomainError, EventModel, Period};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFamily {
    Pie,
}

impl ChartFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pie => "pie",
        }
    }
}

impl FromStr for ChartFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pie" => Ok(Self::Pie),
            other => Err(DomainError::UnsupportedChart(format!(
                "unknown chart type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSubtype {
    /// One slice per category.
    PersonCategory,
    /// One slice per participant.
    CategoryPerson,
}

impl ChartSubtype {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersonCategory => "person-category",
            Self::CategoryPerson => "category-person",
        }
    }
}

impl FromStr for ChartSubtype {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person-category" => Ok(Self::PersonCategory),
            "category-person" => Ok(Self::CategoryPerson),
            other => Err(DomainError::UnsupportedChart(format!(
                "unknown chart subtype '{}'",
                other
            ))),
        }
    }
}

/// One cell of a chart data table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartCell {
    Text(String),
    Number(i64),
    Null,
}

impl From<&str> for ChartCell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ChartCell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ChartCell {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for ChartCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Null => Ok(()),
        }
    }
}

/// Header row first, then one row per slice. Empty when there is nothing to chart.
pub type ChartData = Vec<Vec<ChartCell>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionParams {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub label: String,
    pub minutes: i64,
}

/// Aggregated slices, already sorted by descending minutes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataParams {
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub option_params: OptionParams,
    pub data_params: DataParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartBuilder {
    ParticipantCategoriesPie,
    CategoryParticipantsPie,
}

type Constructor = fn() -> ChartBuilder;

const BUILDERS: &[(ChartFamily, ChartSubtype, Constructor)] = &[
    (
        ChartFamily::Pie,
        ChartSubtype::PersonCategory,
        ChartBuilder::participant_categories_pie,
    ),
    (
        ChartFamily::Pie,
        ChartSubtype::CategoryPerson,
        ChartBuilder::category_participants_pie,
    ),
];

const HEADER: [&str; 3] = ["name", "value", "percentage"];

impl ChartBuilder {
    pub fn participant_categories_pie() -> Self {
        Self::ParticipantCategoriesPie
    }

    pub fn category_participants_pie() -> Self {
        Self::CategoryParticipantsPie
    }

    pub fn resolve(family: ChartFamily, subtype: ChartSubtype) -> Result<Self, DomainError> {
        BUILDERS
            .iter()
            .find(|(f, s, _)| *f == family && *s == subtype)
            .map(|(_, _, build)| build())
            .ok_or_else(|| {
                DomainError::UnsupportedChart(format!(
                    "no builder for {}/{}",
                    family.as_str(),
                    subtype.as_str()
                ))
            })
    }

    pub fn from_tags(family: &str, subtype: &str) -> Result<Self, DomainError> {
        Self::resolve(family.parse()?, subtype.parse()?)
    }

    /// Registered `(family, subtype)` combinations, in table order.
    pub fn available() -> impl Iterator<Item = (ChartFamily, ChartSubtype)> {
        BUILDERS.iter().map(|(f, s, _)| (*f, *s))
    }

    pub fn generate_params(&self, period: Option<&Period>, events: &[EventModel]) -> ChartParams {
        let subtitle = period
            .map(|p| p.duration.short_text())
            .unwrap_or_else(|| "Period".to_string());
        let (title, slices) = match self {
            Self::ParticipantCategoriesPie => (
                "Categories",
                aggregate(events, |e| (e.category.id.as_str(), e.category.title.clone())),
            ),
            Self::CategoryParticipantsPie => (
                "Participants",
                aggregate(events, |e| {
                    (e.participant.id.as_str(), e.participant.full_name())
                }),
            ),
        };
        ChartParams {
            option_params: OptionParams {
                title: title.to_string(),
                subtitle,
            },
            data_params: DataParams { slices },
        }
    }

    pub fn build_options(&self, params: &OptionParams) -> serde_json::Value {
        json!({
            "title": {
                "text": params.title,
                "subtext": params.subtitle,
                "left": "center"
            },
            "tooltip": { "trigger": "item" },
            "legend": { "orient": "vertical", "left": "left" },
            "series": [{
                "name": self.series_name(),
                "type": "pie",
                "radius": "50%",
                "emphasis": {
                    "itemStyle": {
                        "shadowBlur": 10,
                        "shadowOffsetX": 0,
                        "shadowColor": "rgba(0, 0, 0, 0.5)"
                    }
                }
            }]
        })
    }

    pub fn build_data(&self, params: &DataParams) -> ChartData {
        if params.slices.is_empty() {
            return Vec::new();
        }
        let mut rows: ChartData = Vec::with_capacity(params.slices.len() + 1);
        rows.push(HEADER.iter().map(|h| ChartCell::from(*h)).collect());
        rows.extend(
            params
                .slices
                .iter()
                .map(|s| vec![ChartCell::from(s.label.clone()), ChartCell::from(s.minutes)]),
        );
        rows
    }

    fn series_name(&self) -> &'static str {
        match self {
            Self::ParticipantCategoriesPie => "Minutes Spent in Categories",
            Self::CategoryParticipantsPie => "Minutes Spent by Participants",
        }
    }
}

/// Sum minutes per key. First-seen order is kept for ties (stable sort).
fn aggregate<'a>(
    events: &'a [EventModel],
    key_of: impl Fn(&'a EventModel) -> (&'a str, String),
) -> Vec<Slice> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut slices: Vec<Slice> = Vec::new();
    for event in events {
        let (key, label) = key_of(event);
        let minutes = event.duration_minutes();
        match index.get(key) {
            Some(&i) => slices[i].minutes += minutes,
            None => {
                index.insert(key, slices.len());
                slices.push(Slice { label, minutes });
            }
        }
    }
    slices.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryModel, ParticipantModel, PeriodDuration};
    use chrono::{Duration, TimeZone, Utc};

    fn event(id: &str, category: (&str, &str), person: (&str, &str), minutes: i64) -> EventModel {
        let start = Utc.with_ymd_and_hms(2025, 10, 22, 1, 0, 0).unwrap();
        EventModel {
            id: Some(id.into()),
            title: format!("event {}", id),
            start,
            end: start + Duration::minutes(minutes),
            category: CategoryModel {
                id: category.0.into(),
                title: category.1.into(),
            },
            participant: ParticipantModel {
                id: person.0.into(),
                firstname: person.1.into(),
                lastname: "Doe".into(),
                image_url: String::new(),
            },
        }
    }

    fn week() -> Period {
        Period {
            id: "w".into(),
            name: "This Week".into(),
            duration: PeriodDuration::new(
                Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 10, 26, 23, 59, 59).unwrap(),
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_category_breakdown_sorted_descending() {
        let events = vec![
            event("1", ("a", "A"), ("p1", "Jo"), 10),
            event("2", ("b", "B"), ("p1", "Jo"), 45),
            event("3", ("a", "A"), ("p2", "Al"), 20),
        ];
        let builder = ChartBuilder::from_tags("pie", "person-category").unwrap();
        let params = builder.generate_params(Some(&week()), &events);

        let expected: ChartData = vec![
            vec!["name".into(), "value".into(), "percentage".into()],
            vec!["B".into(), ChartCell::from(45)],
            vec!["A".into(), ChartCell::from(30)],
        ];
        assert_eq!(builder.build_data(&params.data_params), expected);
        assert_eq!(params.option_params.title, "Categories");
        assert_eq!(params.option_params.subtitle, "Oct 20 - Oct 26");
    }

    #[test]
    fn test_empty_events_give_empty_table() {
        let builder = ChartBuilder::resolve(ChartFamily::Pie, ChartSubtype::CategoryPerson).unwrap();
        let params = builder.generate_params(None, &[]);
        assert!(builder.build_data(&params.data_params).is_empty());
        assert_eq!(params.option_params.subtitle, "Period");
    }

    #[test]
    fn test_participant_breakdown_keeps_first_seen_order_on_ties() {
        let events = vec![
            event("1", ("a", "A"), ("p2", "Al"), 15),
            event("2", ("a", "A"), ("p1", "Jo"), 15),
        ];
        let builder = ChartBuilder::category_participants_pie();
        let params = builder.generate_params(None, &events);
        let labels: Vec<&str> = params
            .data_params
            .slices
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Al Doe", "Jo Doe"]);
        assert_eq!(params.option_params.title, "Participants");
    }

    #[test]
    fn test_options_document_shape() {
        let builder = ChartBuilder::participant_categories_pie();
        let options = builder.build_options(&OptionParams {
            title: "Categories".into(),
            subtitle: "Period".into(),
        });
        assert_eq!(options["title"]["text"], "Categories");
        assert_eq!(options["series"][0]["type"], "pie");
        assert_eq!(options["series"][0]["name"], "Minutes Spent in Categories");
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert!(matches!(
            ChartBuilder::from_tags("radar", "person-category"),
            Err(DomainError::UnsupportedChart(_))
        ));
        assert!(ChartBuilder::from_tags("pie", "nope").is_err());
        assert_eq!(ChartBuilder::available().count(), 2);
    }

    #[test]
    fn test_data_serializes_as_plain_rows() {
        let data: ChartData = vec![vec!["B".into(), ChartCell::from(45)]];
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"[["B",45]]"#);
    }
}
