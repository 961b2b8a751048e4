//! Blind Spot composition library
//!
//! Deterministic, network-free building blocks for the critique pipeline:
//! - Report template loading and single-pass placeholder substitution
//! - Static severity map with HTML and terminal bar renderers
//! - Debate transcript parsing into speaker turns
//!
//! Nothing in this crate talks to a language model. The agent crate feeds it
//! model output and gets back text that front-ends can render directly.
//!
//! # Usage
//!
//! ```rust
//! use composition::{build_report, build_severity_bars, ReportSections, ReportTemplate};
//!
//! let template = ReportTemplate::builtin();
//! let report = build_report(
//!     &template,
//!     &ReportSections {
//!         analyzer_output: "A1",
//!         perspective_output: "P1",
//!         skeptic_output: "S1",
//!         exec_summary: "summary",
//!         top_three: "1. 2. 3.",
//!         recommendations: "- do it",
//!     },
//! );
//! assert!(report.contains("A1"));
//! assert_eq!(build_severity_bars().len(), 5);
//! ```

pub mod errors;
pub mod severity;
pub mod template;
pub mod transcript;

pub use errors::{CompositionError, CompositionResult};
pub use severity::{
    build_severity_bars, clamp_score, render_severity_html, render_severity_text, SeverityBar,
    SeverityMap, SEVERITY_WARNING_HTML,
};
pub use template::{build_report, Placeholder, ReportSections, ReportTemplate};
pub use transcript::{DebateTranscript, DebateTurn, Speaker};
