use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which title-span variant of the title-basics schema to decode.
///
/// The source dumps have been observed with both a year-pair and a date-pair
/// layout for the fifth and sixth optional fields. Neither is treated as
/// canonical; the active variant is selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanSchema {
    Years,
    Dates,
}

impl Default for SpanSchema {
    fn default() -> Self {
        SpanSchema::Years
    }
}

/// Start/end span of a title, in the shape the active schema variant dictates.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TitleSpan {
    #[serde(rename_all = "camelCase")]
    Years {
        #[serde(skip_serializing_if = "Option::is_none")]
        start_year: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_year: Option<i32>,
    },
    #[serde(rename_all = "camelCase")]
    Dates {
        #[serde(skip_serializing_if = "Option::is_none")]
        start_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
    },
}

/// One record of the title-basics dataset, ready for indexing.
///
/// Optional fields are explicitly nullable; an absent value is distinct from
/// an empty string or zero and is omitted from the serialized document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitleBasicInfo {
    pub tconst: String,
    pub title_type: String,
    pub primary_title: String,
    pub original_title: String,
    pub is_adult: bool,
    #[serde(flatten)]
    pub span: TitleSpan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

/// One record of the principal-cast dataset, enriched through the run caches.
///
/// `movie_title` and `name` are display names resolved by identifier lookup;
/// a reference to an identifier unseen in this run yields `None`, not an
/// error, and the record is still produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitlePrincipal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_title: Option<String>,
    pub ordering: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_documents() {
        let record = TitlePrincipal {
            movie_title: None,
            ordering: 1,
            name: Some("Carmencita".to_string()),
            category: "self".to_string(),
            job: None,
            characters: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("movieTitle"));
        assert!(!object.contains_key("job"));
        assert!(!object.contains_key("characters"));
        assert_eq!(object["ordering"], 1);
        assert_eq!(object["name"], "Carmencita");
    }

    #[test]
    fn title_span_flattens_into_the_document() {
        let record = TitleBasicInfo {
            tconst: "tt0000001".to_string(),
            title_type: "short".to_string(),
            primary_title: "Carmencita".to_string(),
            original_title: "Carmencita".to_string(),
            is_adult: false,
            span: TitleSpan::Years {
                start_year: Some(1894),
                end_year: None,
            },
            runtime_minutes: Some(1),
            genres: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["startYear"], 1894);
        assert!(json.get("endYear").is_none());
        assert_eq!(json["titleType"], "short");
        assert_eq!(json["isAdult"], false);
    }

    #[test]
    fn date_span_serializes_camel_case_dates() {
        let span = TitleSpan::Dates {
            start_date: NaiveDate::from_ymd_opt(1894, 3, 10),
            end_date: None,
        };

        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["startDate"], "1894-03-10");
        assert!(json.get("endDate").is_none());
    }
}
