//! Severity heatmap: category scores and their bar-chart renderings.
//!
//! The map is static: the same five categories and scores for every run. It
//! is not derived from agent output.
//!
//! Renderers accept loosely typed JSON so that any upstream shape degrades
//! gracefully: a non-object renders a fixed warning, out-of-range scores are
//! clamped to `[0, 100]`, and non-numeric scores render as `0`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered in place of the chart when the input is not a mapping.
pub const SEVERITY_WARNING_HTML: &str = "<p>⚠️ Could not compute severity distribution.</p>";

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 100.0;

/// One category and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBar {
    pub label: String,
    pub score: f64,
}

/// Ordered mapping from category label to score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityMap {
    bars: Vec<SeverityBar>,
}

impl SeverityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category, or overwrite its score if the label already exists.
    pub fn insert(&mut self, label: impl Into<String>, score: f64) {
        let label = label.into();
        match self.bars.iter_mut().find(|b| b.label == label) {
            Some(bar) => bar.score = score,
            None => self.bars.push(SeverityBar { label, score }),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.bars.iter().find(|b| b.label == label).map(|b| b.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeverityBar> {
        self.bars.iter()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Label → score JSON object, insertion order preserved.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for bar in &self.bars {
            map.insert(bar.label.clone(), Value::from(bar.score));
        }
        Value::Object(map)
    }
}

impl FromIterator<(String, f64)> for SeverityMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, score) in iter {
            map.insert(label, score);
        }
        map
    }
}

/// The fixed five-category severity distribution.
pub fn build_severity_bars() -> SeverityMap {
    [
        ("Assumptions", 70.0),
        ("Risks", 80.0),
        ("Perspectives", 65.0),
        ("Evidence", 60.0),
        ("Fragility", 75.0),
    ]
    .into_iter()
    .map(|(label, score)| (label.to_string(), score))
    .collect()
}

/// Clamp a score into `[0, 100]`; NaN becomes `0`.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        MIN_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Numeric value of a JSON score: numbers as-is, numeric strings parsed,
/// everything else `0`.
fn score_from_value(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(MIN_SCORE),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(MIN_SCORE),
        _ => MIN_SCORE,
    };
    clamp_score(raw)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
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
    out
}

/// Render a horizontal bar "heatmap" as an HTML fragment.
pub fn render_severity_html(data: &Value) -> String {
    let Value::Object(entries) = data else {
        return SEVERITY_WARNING_HTML.to_string();
    };

    let mut html = String::from("<div style='display:flex;flex-direction:column;gap:12px;'>");
    for (label, raw_score) in entries {
        let score = score_from_value(raw_score);
        html.push_str(&format!(
            r#"
<div style="font-family: system-ui, sans-serif; font-size: 0.9rem;">
    <div style="display:flex;justify-content:space-between;">
        <strong>{label}</strong>
        <span>{score:.0}%</span>
    </div>
    <div style="background: #222; height: 10px; border-radius: 999px; overflow: hidden; box-shadow: inset 0 0 4px rgba(0,0,0,0.7);">
        <div style="height: 10px; width: {score:.0}%; background: linear-gradient(90deg, #ff4d4d, #ffb347);"></div>
    </div>
</div>"#,
            label = escape_html(label),
            score = score,
        ));
    }
    html.push_str("\n</div>");
    html
}

/// Render a fixed-width terminal bar chart, one category per line.
pub fn render_severity_text(map: &SeverityMap, width: usize) -> String {
    let label_width = map.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    map.iter()
        .map(|bar| {
            let score = clamp_score(bar.score);
            let filled = ((score / MAX_SCORE) * width as f64).round() as usize;
            format!(
                "{:<label_width$}  {}{}  {:>3.0}%",
                bar.label,
                "█".repeat(filled),
                "░".repeat(width.saturating_sub(filled)),
                score,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_bars_in_order() {
        let map = build_severity_bars();
        let labels: Vec<&str> = map.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Assumptions", "Risks", "Perspectives", "Evidence", "Fragility"]
        );
        assert_eq!(map.get("Risks"), Some(80.0));
    }

    #[test]
    fn test_to_value_preserves_order() {
        let value = build_severity_bars().to_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "Assumptions");
        assert_eq!(keys[4], "Fragility");
    }

    #[test]
    fn test_html_clamps_out_of_range() {
        let html = render_severity_html(&json!({ "Risks": 150, "Evidence": -20 }));
        assert!(html.contains("<span>100%</span>"));
        assert!(html.contains("<span>0%</span>"));
        assert!(!html.contains("150%"));
    }

    #[test]
    fn test_html_non_numeric_score_is_zero() {
        let html = render_severity_html(&json!({ "Risks": "very high", "Evidence": null }));
        assert_eq!(html.matches("<span>0%</span>").count(), 2);
    }

    #[test]
    fn test_html_numeric_string_is_parsed() {
        let html = render_severity_html(&json!({ "Risks": " 42 " }));
        assert!(html.contains("<span>42%</span>"));
    }

    #[test]
    fn test_html_non_mapping_is_warning() {
        assert_eq!(render_severity_html(&json!([1, 2, 3])), SEVERITY_WARNING_HTML);
        assert_eq!(render_severity_html(&Value::Null), SEVERITY_WARNING_HTML);
    }

    #[test]
    fn test_html_escapes_labels() {
        let html = render_severity_html(&json!({ "<script>": 10 }));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_clamp_score_nan() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(100.5), 100.0);
    }

    #[test]
    fn test_text_bars() {
        let mut map = SeverityMap::new();
        map.insert("Risks", 50.0);
        map.insert("Fragility", 250.0);
        let text = render_severity_text(&map, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("█████░░░░░"));
        assert!(lines[0].ends_with(" 50%"));
        assert!(lines[1].contains("██████████"));
        assert!(lines[1].ends_with("100%"));
    }

    #[test]
    fn test_insert_overwrites_existing_label() {
        let mut map = build_severity_bars();
        map.insert("Risks", 10.0);
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("Risks"), Some(10.0));
    }
}
