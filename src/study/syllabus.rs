//! Pulling a syllabus out of free-form generator output.
//!
//! Models tend to wrap the requested JSON in chatter ("Here you go: … Hope
//! this helps!"). The array is taken from the first `[` to the last `]`
//! inclusive. Any unrelated bracket text outside the array breaks this.

use thiserror::Error;

use crate::model::Chapter;

#[derive(Debug, Error)]
pub enum SyllabusParseError {
    #[error("no JSON array found in generator output")]
    NoArray,
    #[error("invalid syllabus JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Slice from the first `[` to the last `]`, both inclusive.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

/// Extract and decode a `[{title, topics}]` array.
pub fn parse_syllabus(raw: &str) -> Result<Vec<Chapter>, SyllabusParseError> {
    let json = extract_json_array(raw).ok_or(SyllabusParseError::NoArray)?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_exact_bracketed_substring() {
        let raw = r#"preamble text [ {"title":"A","topics":["x"]} ] trailing text"#;
        assert_eq!(extract_json_array(raw), Some(r#"[ {"title":"A","topics":["x"]} ]"#));

        let chapters = parse_syllabus(raw).unwrap();
        assert_eq!(chapters, vec![Chapter { title: "A".into(), topics: vec!["x".into()] }]);
    }

    #[test]
    fn conversational_wrapper_is_trimmed() {
        let raw = r#"Here you go: [{"title":"Basics","topics":["Variables","Functions"]}] Hope this helps!"#;
        let chapters = parse_syllabus(raw).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Basics");
        assert_eq!(chapters[0].topics, vec!["Variables", "Functions"]);
    }

    #[test]
    fn bare_array_parses() {
        let chapters = parse_syllabus(r#"[{"title":"A","topics":[]},{"title":"B","topics":["y"]}]"#).unwrap();
        assert_eq!(chapters.len(), 2);
        assert!(chapters[0].topics.is_empty());
    }

    #[test]
    fn missing_brackets_is_no_array() {
        assert!(matches!(parse_syllabus("no json here"), Err(SyllabusParseError::NoArray)));
        assert!(matches!(parse_syllabus("only [ open"), Err(SyllabusParseError::NoArray)));
        assert!(matches!(parse_syllabus("] reversed ["), Err(SyllabusParseError::NoArray)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = parse_syllabus(r#"[{"title":"A","topics":["x"]"#).unwrap_err();
        assert!(matches!(err, SyllabusParseError::NoArray | SyllabusParseError::Json(_)));
        let err = parse_syllabus(r#"[{"title":"A","topics":["x"}]"#).unwrap_err();
        assert!(matches!(err, SyllabusParseError::Json(_)));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(parse_syllabus(r#"["just", "strings"]"#).is_err());
        assert!(parse_syllabus(r#"[{"title":"A"}]"#).is_err());
    }

    #[test]
    fn stray_brackets_in_trailing_text_break_extraction() {
        let raw = r#"[{"title":"A","topics":["x"]}] see [1]"#;
        assert!(matches!(parse_syllabus(raw), Err(SyllabusParseError::Json(_))));
    }
}
