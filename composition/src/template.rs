//! Report template: six named placeholders, one substitution pass.
//!
//! The template is scanned once, left to right. Each placeholder token found
//! in the template is replaced by its section text; replacement text is
//! emitted verbatim and never rescanned, so agent output that happens to
//! contain `{SKEPTIC_OUTPUT}` stays exactly as the agent wrote it.

use std::path::Path;

use tracing::debug;

use crate::errors::{CompositionError, CompositionResult};

/// Built-in report layout used when no template file is configured.
pub const DEFAULT_REPORT_TEMPLATE: &str = "\
# Blind Spot Report

## Executive Summary
{EXEC_SUMMARY}

## Top 3 Actions
{TOP_THREE}

## Analyzer Agent: Structural Weaknesses
{ANALYZER_OUTPUT}

## Perspective Agent: Missing Viewpoints
{PERSPECTIVE_OUTPUT}

## Skeptic Agent: Red-Team Findings
{SKEPTIC_OUTPUT}

## Recommendations
{RECOMMENDATIONS}
";

/// A named slot in the report template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    AnalyzerOutput,
    PerspectiveOutput,
    SkepticOutput,
    ExecSummary,
    TopThree,
    Recommendations,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Self::AnalyzerOutput,
        Self::PerspectiveOutput,
        Self::SkepticOutput,
        Self::ExecSummary,
        Self::TopThree,
        Self::Recommendations,
    ];

    /// Literal token as it appears in the template.
    pub fn token(self) -> &'static str {
        match self {
            Self::AnalyzerOutput => "{ANALYZER_OUTPUT}",
            Self::PerspectiveOutput => "{PERSPECTIVE_OUTPUT}",
            Self::SkepticOutput => "{SKEPTIC_OUTPUT}",
            Self::ExecSummary => "{EXEC_SUMMARY}",
            Self::TopThree => "{TOP_THREE}",
            Self::Recommendations => "{RECOMMENDATIONS}",
        }
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Text for every placeholder of one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportSections<'a> {
    pub analyzer_output: &'a str,
    pub perspective_output: &'a str,
    pub skeptic_output: &'a str,
    pub exec_summary: &'a str,
    pub top_three: &'a str,
    pub recommendations: &'a str,
}

impl<'a> ReportSections<'a> {
    pub fn get(&self, placeholder: Placeholder) -> &'a str {
        match placeholder {
            Placeholder::AnalyzerOutput => self.analyzer_output,
            Placeholder::PerspectiveOutput => self.perspective_output,
            Placeholder::SkepticOutput => self.skeptic_output,
            Placeholder::ExecSummary => self.exec_summary,
            Placeholder::TopThree => self.top_three,
            Placeholder::Recommendations => self.recommendations,
        }
    }
}

/// A validated report template.
///
/// Construction guarantees that every placeholder occurs at least once, so a
/// rendered report can never be partially substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate {
    text: String,
}

impl ReportTemplate {
    /// Validate template text.
    pub fn parse(text: impl Into<String>) -> CompositionResult<Self> {
        let text = text.into();
        if let Some(missing) = Placeholder::ALL
            .iter()
            .find(|p| !text.contains(p.token()))
        {
            return Err(CompositionError::MissingPlaceholder(missing.token()));
        }
        Ok(Self { text })
    }

    /// Read and validate a template file.
    pub fn load(path: &Path) -> CompositionResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            CompositionError::TemplateRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), bytes = text.len(), "loaded report template");
        Self::parse(text)
    }

    /// The built-in layout.
    pub fn builtin() -> Self {
        Self {
            text: DEFAULT_REPORT_TEMPLATE.to_string(),
        }
    }

    /// Substitute all placeholders in a single pass.
    pub fn render(&self, sections: &ReportSections<'_>) -> String {
        let extra: usize = Placeholder::ALL.iter().map(|p| sections.get(*p).len()).sum();
        let mut out = String::with_capacity(self.text.len() + extra);
        let mut rest = self.text.as_str();

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            match Placeholder::ALL.iter().find(|p| tail.starts_with(p.token())) {
                Some(p) => {
                    out.push_str(sections.get(*p));
                    rest = &tail[p.token().len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Compose the final report text.
pub fn build_report(template: &ReportTemplate, sections: &ReportSections<'_>) -> String {
    template.render(sections)
}
