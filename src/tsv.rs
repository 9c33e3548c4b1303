use chrono::NaiveDate;

use crate::constants::NULL_MARKER;
use crate::error::{IndexerError, Result};

/// Field delimiter of the dataset dumps.
pub const DELIMITER: char = '\t';

/// Ordered field reader over one tab-delimited record line.
///
/// Fields are consumed left to right, exactly as many as the caller asks for;
/// there is no upfront field-count validation. Running out of tokens while a
/// decoder still needs one is a malformed-record error. The tokenizer itself
/// never interprets the `\N` null marker: required identifiers never carry it,
/// so marker decoding is the per-field concern of the `optional_*` readers.
pub struct Fields<'a> {
    tokens: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split(DELIMITER),
        }
    }

    fn next_token(&mut self, field: &str) -> Result<&'a str> {
        self.tokens.next().ok_or_else(|| {
            IndexerError::MalformedRecord(format!("line ended before field '{field}'"))
        })
    }

    /// Consume a field that is always present, verbatim.
    pub fn required(&mut self, field: &str) -> Result<&'a str> {
        self.next_token(field)
    }

    /// Consume a field, decoding the null marker to `None`.
    pub fn optional(&mut self, field: &str) -> Result<Option<&'a str>> {
        let token = self.next_token(field)?;
        Ok(if token == NULL_MARKER { None } else { Some(token) })
    }

    pub fn required_i32(&mut self, field: &str) -> Result<i32> {
        let token = self.next_token(field)?;
        token.parse().map_err(|_| {
            IndexerError::MalformedRecord(format!("field '{field}' is not an integer: '{token}'"))
        })
    }

    pub fn optional_i32(&mut self, field: &str) -> Result<Option<i32>> {
        match self.optional(field)? {
            None => Ok(None),
            Some(token) => token.parse().map(Some).map_err(|_| {
                IndexerError::MalformedRecord(format!(
                    "field '{field}' is not an integer: '{token}'"
                ))
            }),
        }
    }

    pub fn optional_date(&mut self, field: &str) -> Result<Option<NaiveDate>> {
        match self.optional(field)? {
            None => Ok(None),
            Some(token) => NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    IndexerError::MalformedRecord(format!(
                        "field '{field}' is not a date: '{token}'"
                    ))
                }),
        }
    }

    /// Consume a comma-separated field into an ordered list.
    pub fn optional_list(&mut self, field: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .optional(field)?
            .map(|token| token.split(',').map(str::to_string).collect()))
    }

    /// Consume a field encoded as a pseudo-array literal, e.g. `["Herself"]`.
    /// The literal `[` and `]` are stripped before splitting on `,`.
    pub fn optional_bracketed_list(&mut self, field: &str) -> Result<Option<Vec<String>>> {
        Ok(self.optional(field)?.map(|token| {
            token
                .replace('[', "")
                .replace(']', "")
                .split(',')
                .map(str::to_string)
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_come_back_in_original_order() {
        let mut fields = Fields::new("a\tb\tc");
        assert_eq!(fields.required("first").unwrap(), "a");
        assert_eq!(fields.required("second").unwrap(), "b");
        assert_eq!(fields.required("third").unwrap(), "c");
    }

    #[test]
    fn required_fields_pass_the_marker_through_verbatim() {
        // Marker decoding is opt-in per field; a required read never converts.
        let mut fields = Fields::new("\\N");
        assert_eq!(fields.required("id").unwrap(), "\\N");
    }

    #[test]
    fn optional_fields_decode_the_marker_to_none() {
        let mut fields = Fields::new("\\N\tvalue");
        assert_eq!(fields.optional("a").unwrap(), None);
        assert_eq!(fields.optional("b").unwrap(), Some("value"));
    }

    #[test]
    fn running_out_of_tokens_is_a_malformed_record() {
        let mut fields = Fields::new("only");
        fields.required("first").unwrap();
        let err = fields.required("second").unwrap_err();
        assert!(matches!(err, IndexerError::MalformedRecord(_)));
    }

    #[test]
    fn optional_integer_decodes_marker_and_rejects_garbage() {
        let mut fields = Fields::new("\\N\t1894\tabc");
        assert_eq!(fields.optional_i32("a").unwrap(), None);
        assert_eq!(fields.optional_i32("b").unwrap(), Some(1894));
        let err = fields.optional_i32("c").unwrap_err();
        assert!(matches!(err, IndexerError::MalformedRecord(_)));
    }

    #[test]
    fn optional_date_parses_iso_dates() {
        let mut fields = Fields::new("1894-03-10\t\\N");
        assert_eq!(
            fields.optional_date("start").unwrap(),
            NaiveDate::from_ymd_opt(1894, 3, 10)
        );
        assert_eq!(fields.optional_date("end").unwrap(), None);
    }

    #[test]
    fn list_fields_split_on_commas_in_order() {
        let mut fields = Fields::new("Documentary,Short");
        assert_eq!(
            fields.optional_list("genres").unwrap(),
            Some(vec!["Documentary".to_string(), "Short".to_string()])
        );
    }

    #[test]
    fn bracketed_list_strips_the_array_literal_syntax() {
        let mut fields = Fields::new("[\"Herself\"]");
        assert_eq!(
            fields.optional_bracketed_list("characters").unwrap(),
            Some(vec!["\"Herself\"".to_string()])
        );
    }
}
