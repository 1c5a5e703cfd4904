//! # HTML test report
//!
//! An in-process report made of tests, each holding named nodes, each holding log entries.
//! Nothing touches the filesystem until [`Report::flush`], which writes one self-contained
//! HTML document with the report model embedded as JSON.
//!
//! ## Status
//!
//! A node's status is the most severe section logged under it
//! (fail > skip > warning > pass > info); a test's status is the most severe of its nodes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{ReportError, SinkError};
use crate::sink::{CodeLanguage, Media, ReportSection, ReportSink};

// ============================================================================
// REPORT MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub section: ReportSection,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportNode {
    pub name: String,
    pub entries: Vec<ReportEntry>,
}

impl ReportNode {
    pub fn status(&self) -> ReportSection {
        most_severe(self.entries.iter().map(|entry| entry.section))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTest {
    pub name: String,
    pub nodes: Vec<ReportNode>,
}

impl ReportTest {
    pub fn status(&self) -> ReportSection {
        most_severe(self.nodes.iter().map(ReportNode::status))
    }
}

/// Test counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
}

fn summarize(tests: &[ReportTest]) -> ReportSummary {
    let mut summary = ReportSummary {
        tests: tests.len(),
        ..ReportSummary::default()
    };
    for test in tests {
        match test.status() {
            ReportSection::Fail => summary.failed += 1,
            ReportSection::Skip => summary.skipped += 1,
            ReportSection::Warning => summary.warnings += 1,
            ReportSection::Pass | ReportSection::Info => summary.passed += 1,
        }
    }
    summary
}

fn most_severe(sections: impl Iterator<Item = ReportSection>) -> ReportSection {
    sections
        .max_by_key(|section| section.severity())
        .unwrap_or(ReportSection::Info)
}

#[derive(Debug, Default)]
struct ReportState {
    tests: Vec<ReportTest>,
    current_test: Option<usize>,
    current_node: Option<usize>,
}

impl ReportState {
    fn test_mut(&mut self) -> Result<&mut ReportTest, ReportError> {
        let index = self.current_test.ok_or(ReportError::NoActiveTest)?;
        self.tests.get_mut(index).ok_or(ReportError::NoActiveTest)
    }

    fn node_mut(&mut self) -> Option<&mut ReportNode> {
        let (test, node) = (self.current_test?, self.current_node?);
        self.tests.get_mut(test)?.nodes.get_mut(node)
    }

    fn current_test_name(&self) -> Option<&str> {
        self.tests
            .get(self.current_test?)
            .map(|test| test.name.as_str())
    }

    fn current_node_name(&self) -> Option<&str> {
        let test = self.tests.get(self.current_test?)?;
        test.nodes.get(self.current_node?).map(|node| node.name.as_str())
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// The suite's HTML report. Shared between tests; all state sits behind one lock.
#[derive(Debug)]
pub struct Report {
    file: PathBuf,
    title: String,
    state: Mutex<ReportState>,
}

impl Report {
    /// Targets `path/filename.html`; a missing `.html` on `filename` is added. Nothing is
    /// written until `flush`.
    pub fn create(path: impl AsRef<Path>, filename: &str) -> Self {
        let title = filename
            .strip_suffix(".html")
            .unwrap_or(filename)
            .to_string();
        Self {
            file: path.as_ref().join(format!("{}.html", title)),
            title,
            state: Mutex::default(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Starts a new test and makes it current. No-op when the current test has this name.
    pub fn create_test(&self, name: &str) {
        let mut state = self.lock();
        if state.current_test_name() == Some(name) {
            return;
        }
        state.tests.push(ReportTest {
            name: name.to_string(),
            nodes: Vec::new(),
        });
        state.current_test = Some(state.tests.len() - 1);
        state.current_node = None;
    }

    /// Adds a node to the current test and makes it current.
    pub fn create_node(&self, name: &str) -> Result<(), ReportError> {
        let mut state = self.lock();
        if state.current_node_name() == Some(name) {
            return Ok(());
        }
        let test = state.test_mut()?;
        test.nodes.push(ReportNode {
            name: name.to_string(),
            entries: Vec::new(),
        });
        let index = test.nodes.len() - 1;
        state.current_node = Some(index);
        Ok(())
    }

    pub fn rename_current_test(&self, name: &str) -> Result<(), ReportError> {
        let mut state = self.lock();
        state.test_mut()?.name = name.to_string();
        Ok(())
    }

    pub fn rename_current_node(&self, name: &str) -> Result<(), ReportError> {
        let mut state = self.lock();
        state.test_mut()?;
        let node = state.node_mut().ok_or(ReportError::NoActiveNode)?;
        node.name = name.to_string();
        Ok(())
    }

    pub fn is_current_test(&self, name: &str) -> bool {
        self.lock().current_test_name() == Some(name)
    }

    pub fn is_current_node(&self, name: &str) -> bool {
        self.lock().current_node_name() == Some(name)
    }

    pub fn current_node(&self) -> Option<String> {
        self.lock().current_node_name().map(str::to_string)
    }

    pub fn test_exists(&self, name: &str) -> bool {
        self.lock().tests.iter().any(|test| test.name == name)
    }

    /// Appends an entry to the current node. Without a node the entry is dropped.
    pub fn log(&self, section: ReportSection, text: &str, media: Option<Media>) {
        let mut state = self.lock();
        if let Some(node) = state.node_mut() {
            node.entries.push(ReportEntry {
                section,
                text: text.to_string(),
                media,
                timestamp: Local::now(),
            });
        }
    }

    /// Snapshot of every test recorded so far.
    pub fn tests(&self) -> Vec<ReportTest> {
        self.lock().tests.clone()
    }

    pub fn summary(&self) -> ReportSummary {
        summarize(&self.lock().tests)
    }

    /// Writes the HTML document, creating parent directories.
    pub fn flush(&self) -> Result<(), ReportError> {
        let document = {
            let state = self.lock();
            render_document(&self.title, &state.tests, summarize(&state.tests))?
        };
        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.file, document).map_err(|source| ReportError::Io {
            path: self.file.clone(),
            source,
        })?;
        tracing::debug!(target: "vouch", file = %self.file.display(), "report flushed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ReportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportSink for Report {
    fn create_test(&self, name: &str) {
        Report::create_test(self, name);
    }

    fn create_node(&self, name: &str) -> Result<(), ReportError> {
        Report::create_node(self, name)
    }

    fn log(&self, section: ReportSection, text: &str, media: Option<Media>) -> Result<(), SinkError> {
        Report::log(self, section, text, media);
        Ok(())
    }

    fn flush(&self) -> Result<(), ReportError> {
        Report::flush(self)
    }
}

// ============================================================================
// RENDERING
// ============================================================================

#[derive(Serialize)]
struct Model<'m> {
    title: &'m str,
    summary: ReportSummary,
    tests: &'m [ReportTest],
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
.node{margin:.5em 0 .5em 1em}\
.fail{color:#c0392b}.pass{color:#27ae60}.warning,.skip{color:#d68910}.info{color:#2471a3}\
li{color:#222;list-style:none}time{color:#888;margin-right:.5em}\
pre{background:#f4f4f4;padding:.5em}img{max-width:640px}";

fn render_document(
    title: &str,
    tests: &[ReportTest],
    summary: ReportSummary,
) -> Result<String, ReportError> {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    html.push_str(&format!(
        "<p class=\"summary\">{} tests: {} passed, {} failed, {} skipped, {} with warnings</p>\n",
        summary.tests, summary.passed, summary.failed, summary.skipped, summary.warnings
    ));

    for test in tests {
        html.push_str(&format!(
            "<section class=\"test {}\">\n<h2>{}</h2>\n",
            test.status(),
            escape_html(&test.name)
        ));
        for node in &test.nodes {
            html.push_str(&format!(
                "<details class=\"node {}\" open>\n<summary>{}</summary>\n<ul>\n",
                node.status(),
                escape_html(&node.name)
            ));
            for entry in &node.entries {
                html.push_str(&render_entry(entry));
            }
            html.push_str("</ul>\n</details>\n");
        }
        html.push_str("</section>\n");
    }

    let model = serde_json::to_string(&Model {
        title,
        summary,
        tests,
    })?;
    html.push_str(&format!(
        "<script type=\"application/json\" id=\"vouch-model\">{}</script>\n",
        model.replace("</", "<\\/")
    ));
    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn render_entry(entry: &ReportEntry) -> String {
    let media = match &entry.media {
        None => String::new(),
        Some(Media::ScreenshotPath { path }) => {
            format!("<br><img src=\"{}\" alt=\"screenshot\">", escape_html(path))
        }
        Some(Media::ScreenshotBase64 { data }) => format!(
            "<br><img src=\"data:image/png;base64,{}\" alt=\"screenshot\">",
            escape_html(data)
        ),
        Some(Media::CodeBlock { language, code }) => {
            let (class, code) = match language {
                CodeLanguage::Json => ("json", pretty_json(code)),
                CodeLanguage::Xml => ("xml", code.clone()),
            };
            format!(
                "<pre class=\"{}\"><code>{}</code></pre>",
                class,
                escape_html(&code)
            )
        }
    };
    format!(
        "<li class=\"{}\"><time>{}</time>{}{}</li>\n",
        entry.section,
        entry.timestamp.format("%H:%M:%S%.3f"),
        escape_html(&entry.text),
        media
    )
}

/// Re-indents valid JSON; anything else is shown as given.
fn pretty_json(code: &str) -> String {
    serde_json::from_str::<serde_json::Value>(code)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| code.to_string())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
