//! Result rendering
//!
//! Builds the output container markup and the spoken summary.

use std::borrow::Cow;

use super::PredictionResult;

/// How response values are interpolated into markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupMode {
    /// HTML-significant characters are escaped
    #[default]
    Escaped,
    /// Values are inserted as-is and render as markup
    Raw,
}

impl MarkupMode {
    pub fn from_escape_flag(escape: bool) -> Self {
        if escape { Self::Escaped } else { Self::Raw }
    }
}

pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Heading with the mood, then the score, then the suggestion.
pub fn render_result(result: &PredictionResult, mode: MarkupMode) -> String {
    let interpolate = |text: String| match mode {
        MarkupMode::Escaped => escape_html(&text).into_owned(),
        MarkupMode::Raw => text,
    };

    format!(
        "<h2>{}</h2>\n<p>Score: {}</p>\n<p>🧠 Suggestion: {}</p>",
        interpolate(result.mood_text()),
        interpolate(result.score_text()),
        interpolate(result.suggestion_text()),
    )
}

/// Text handed to speech synthesis after a prediction: mood, a space, suggestion.
pub fn spoken_summary(result: &PredictionResult) -> String {
    format!("{} {}", result.mood_text(), result.suggestion_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calm() -> PredictionResult {
        PredictionResult::from_value(json!({
            "mood": "Calm",
            "score": 82,
            "suggestion": "Reduce water use"
        }))
        .unwrap()
    }

    #[test]
    fn test_render_contains_all_three_elements() {
        let html = render_result(&calm(), MarkupMode::Escaped);
        assert!(html.contains("<h2>Calm</h2>"));
        assert!(html.contains("<p>Score: 82</p>"));
        assert!(html.contains("Reduce water use"));
    }

    #[test]
    fn test_render_float_scores() {
        let render = |score: f64| {
            let result = PredictionResult::from_value(json!({
                "mood": "Calm",
                "score": score,
                "suggestion": "x"
            }))
            .unwrap();
            render_result(&result, MarkupMode::Raw)
        };
        assert!(render(82.0).contains("<p>Score: 82</p>"));
        assert!(render(82.5).contains("<p>Score: 82.5</p>"));
    }

    #[test]
    fn test_spoken_summary_joins_mood_and_suggestion() {
        assert_eq!(spoken_summary(&calm()), "Calm Reduce water use");
    }

    #[test]
    fn test_escaped_mode_neutralizes_script() {
        let result = PredictionResult::from_value(json!({
            "mood": "red",
            "score": 70,
            "suggestion": "<script>alert('x')</script>"
        }))
        .unwrap();
        let html = render_result(&result, MarkupMode::Escaped);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_raw_mode_inserts_markup_verbatim() {
        let result = PredictionResult::from_value(json!({
            "mood": "<b>red</b>",
            "score": 70,
            "suggestion": "<script>alert('x')</script>"
        }))
        .unwrap();
        let html = render_result(&result, MarkupMode::Raw);
        assert!(html.contains("<h2><b>red</b></h2>"));
        assert!(html.contains("<script>alert('x')</script>"));
    }

    #[test]
    fn test_render_missing_fields() {
        let result = PredictionResult::default();
        let html = render_result(&result, MarkupMode::Escaped);
        assert!(html.contains("<h2>undefined</h2>"));
        assert!(html.contains("<p>Score: undefined</p>"));
        assert_eq!(spoken_summary(&result), "undefined undefined");
    }

    #[test]
    fn test_escape_html_borrows_clean_text() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
    }

    #[test]
    fn test_mode_from_escape_flag() {
        assert_eq!(MarkupMode::from_escape_flag(true), MarkupMode::Escaped);
        assert_eq!(MarkupMode::from_escape_flag(false), MarkupMode::Raw);
    }
}
