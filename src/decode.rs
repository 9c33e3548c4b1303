use crate::cache::RunCaches;
use crate::error::Result;
use crate::tsv::Fields;
use crate::types::{SpanSchema, TitleBasicInfo, TitlePrincipal, TitleSpan};

/// Decode one title-basics line into a structured record.
///
/// On success the (identifier, primary title) pair is written into the title
/// cache so that principal-cast records processed later in the run can
/// resolve their title reference.
pub fn decode_basic(
    line: &str,
    caches: &RunCaches,
    schema: SpanSchema,
) -> Result<TitleBasicInfo> {
    let mut fields = Fields::new(line);

    let tconst = fields.required("tconst")?.to_string();
    let title_type = fields.required("titleType")?.to_string();
    let primary_title = fields.required("primaryTitle")?.to_string();
    let original_title = fields.required("originalTitle")?.to_string();
    // Anything other than the literal "0" counts as adult, malformed values
    // included. Long-standing behavior of the feed consumers; keep it.
    let is_adult = fields.required("isAdult")? != "0";
    let span = match schema {
        SpanSchema::Years => TitleSpan::Years {
            start_year: fields.optional_i32("startYear")?,
            end_year: fields.optional_i32("endYear")?,
        },
        SpanSchema::Dates => TitleSpan::Dates {
            start_date: fields.optional_date("startDate")?,
            end_date: fields.optional_date("endDate")?,
        },
    };
    let runtime_minutes = fields.optional_i32("runtimeMinutes")?;
    let genres = fields.optional_list("genres")?;

    caches.titles.record(&tconst, &primary_title);

    Ok(TitleBasicInfo {
        tconst,
        title_type,
        primary_title,
        original_title,
        is_adult,
        span,
        runtime_minutes,
        genres,
    })
}

/// Decode one principal-cast line into a structured record.
///
/// The title and person identifiers are resolved to display names through the
/// run caches; a miss yields an absent name (the credits dump may reference
/// titles outside this run), never an error.
pub fn decode_principal(line: &str, caches: &RunCaches) -> Result<TitlePrincipal> {
    let mut fields = Fields::new(line);

    let movie_title = caches.titles.resolve(fields.required("tconst")?);
    let ordering = fields.required_i32("ordering")?;
    let name = caches
        .names
        .resolve(fields.required("nconst")?)
        .map(str::to_string);
    let category = fields.required("category")?.to_string();
    let job = fields.optional("job")?.map(str::to_string);
    let characters = fields.optional_bracketed_list("characters")?;

    Ok(TitlePrincipal {
        movie_title,
        ordering,
        name,
        category,
        job,
        characters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{NameCache, RunCaches};
    use crate::error::IndexerError;

    fn create_caches() -> RunCaches {
        let people = [
            "nconst\tprimaryName\tbirthYear",
            "nm0000001\tCarmencita\t1868",
        ];
        let names = NameCache::from_lines(
            people
                .iter()
                .map(|l| Ok(l.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        )
        .unwrap();
        RunCaches::new(names)
    }

    #[test]
    fn basic_line_decodes_with_nullable_fields() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short";

        let record = decode_basic(line, &caches, SpanSchema::Years).unwrap();

        assert_eq!(record.tconst, "tt0000001");
        assert_eq!(record.title_type, "short");
        assert!(!record.is_adult);
        assert_eq!(
            record.span,
            TitleSpan::Years {
                start_year: Some(1894),
                end_year: None,
            }
        );
        assert_eq!(record.runtime_minutes, Some(1));
        assert_eq!(
            record.genres,
            Some(vec!["Documentary".to_string(), "Short".to_string()])
        );
    }

    #[test]
    fn any_adult_token_other_than_zero_counts_as_adult() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita\tCarmencita\t2\t1894\t\\N\t1\t\\N";

        let record = decode_basic(line, &caches, SpanSchema::Years).unwrap();
        assert!(record.is_adult);
    }

    #[test]
    fn basic_decode_populates_the_title_cache() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\t\\N";

        decode_basic(line, &caches, SpanSchema::Years).unwrap();

        assert_eq!(
            caches.titles.resolve("tt0000001"),
            Some("Carmencita".to_string())
        );
    }

    #[test]
    fn date_schema_decodes_a_date_pair() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894-03-10\t\\N\t1\t\\N";

        let record = decode_basic(line, &caches, SpanSchema::Dates).unwrap();
        assert_eq!(
            record.span,
            TitleSpan::Dates {
                start_date: chrono::NaiveDate::from_ymd_opt(1894, 3, 10),
                end_date: None,
            }
        );
    }

    #[test]
    fn non_numeric_year_fails_the_record() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita\tCarmencita\t0\tonce\t\\N\t1\t\\N";

        let err = decode_basic(line, &caches, SpanSchema::Years).unwrap_err();
        assert!(matches!(err, IndexerError::MalformedRecord(_)));
    }

    #[test]
    fn truncated_basic_line_fails_the_record() {
        let caches = create_caches();
        let line = "tt0000001\tshort\tCarmencita";

        let err = decode_basic(line, &caches, SpanSchema::Years).unwrap_err();
        assert!(matches!(err, IndexerError::MalformedRecord(_)));
    }

    #[test]
    fn principal_line_resolves_both_caches() {
        let caches = create_caches();
        decode_basic(
            "tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\t\\N",
            &caches,
            SpanSchema::Years,
        )
        .unwrap();

        let line = "tt0000001\t1\tnm0000001\tself\t\\N\t[\"Herself\"]";
        let record = decode_principal(line, &caches).unwrap();

        assert_eq!(record.movie_title, Some("Carmencita".to_string()));
        assert_eq!(record.ordering, 1);
        assert_eq!(record.name, Some("Carmencita".to_string()));
        assert_eq!(record.category, "self");
        assert_eq!(record.job, None);
        assert_eq!(record.characters, Some(vec!["\"Herself\"".to_string()]));
    }

    #[test]
    fn unresolved_title_reference_still_produces_a_record() {
        let caches = create_caches();
        let line = "tt9999999\t1\tnm0000001\tself\t\\N\t\\N";

        let record = decode_principal(line, &caches).unwrap();

        assert_eq!(record.movie_title, None);
        assert_eq!(record.name, Some("Carmencita".to_string()));
        assert_eq!(record.characters, None);
    }

    #[test]
    fn unresolved_person_reference_still_produces_a_record() {
        let caches = create_caches();
        let line = "tt9999999\t2\tnm7777777\tdirector\tdirector\t\\N";

        let record = decode_principal(line, &caches).unwrap();

        assert_eq!(record.name, None);
        assert_eq!(record.job, Some("director".to_string()));
    }

    #[test]
    fn non_numeric_ordering_fails_the_record() {
        let caches = create_caches();
        let line = "tt0000001\tfirst\tnm0000001\tself\t\\N\t\\N";

        let err = decode_principal(line, &caches).unwrap_err();
        assert!(matches!(err, IndexerError::MalformedRecord(_)));
    }
}
