//! Read-only viewer for the application's own source code.
//!
//! Sources are embedded at compile time and rendered as HTML with line
//! numbers and per-line keyword/string/comment highlighting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::escape_html;

/// Comments, strings, lifetimes, keywords and numbers, in match priority order.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<comment>//.*$)"#,
        r#"|(?P<string>"(?:[^"\\]|\\.)*")"#,
        r#"|(?P<lifetime>'[a-z_]+\b)"#,
        r#"|(?P<keyword>\b(?:as|async|await|break|const|continue|crate|dyn|else|enum|fn|for|if|impl|in|let|loop|match|mod|move|mut|pub|ref|return|self|Self|static|struct|super|trait|type|unsafe|use|where|while)\b)"#,
        r#"|(?P<number>\b\d[\d_]*(?:\.\d+)?\b)"#,
    ))
    .expect("valid token regex")
});

const TOKEN_CLASSES: [&str; 5] = ["comment", "string", "lifetime", "keyword", "number"];

/// One embedded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the crate root.
    pub path: &'static str,
    pub text: &'static str,
}

impl SourceFile {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

macro_rules! embed {
    ($($path:literal),* $(,)?) => {
        &[$(SourceFile { path: concat!("src/", $path), text: include_str!($path) }),*]
    };
}

static EMBEDDED: &[SourceFile] = embed![
    "table/component.rs",
    "table/query.rs",
    "table/state.rs",
    "table/columns.rs",
    "table/pagination.rs",
    "market/client.rs",
    "market/types.rs",
    "api/render.rs",
    "main.rs",
];

/// Read-only source panel.
#[derive(Debug, Clone)]
pub struct SourceViewer {
    files: &'static [SourceFile],
}

impl Default for SourceViewer {
    fn default() -> Self {
        Self::embedded()
    }
}

impl SourceViewer {
    /// Viewer over the sources compiled into this binary.
    pub fn embedded() -> Self {
        Self { files: EMBEDDED }
    }

    pub fn files(&self) -> &[SourceFile] {
        self.files
    }

    /// Look up a file by path; `None` selects the first file.
    pub fn file(&self, path: Option<&str>) -> Option<&SourceFile> {
        match path {
            Some(path) => self.files.iter().find(|f| f.path == path),
            None => self.files.first(),
        }
    }

    /// Render a file as an HTML table of numbered, highlighted lines.
    pub fn render_html(&self, file: &SourceFile) -> String {
        let mut html = String::with_capacity(file.text.len() * 2);
        html.push_str(r#"<table class="code">"#);
        for (idx, line) in file.text.lines().enumerate() {
            html.push_str(&format!(
                r#"<tr><td class="ln">{}</td><td class="src">{}</td></tr>"#,
                idx + 1,
                highlight_line(line)
            ));
        }
        html.push_str("</table>");
        html
    }
}

/// Escape one line of source and wrap recognized tokens in classed spans.
pub fn highlight_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 32);
    let mut last = 0;

    for caps in TOKEN.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(class) = TOKEN_CLASSES.iter().find(|name| caps.name(name).is_some()) else {
            continue;
        };

        out.push_str(&escape_html(&line[last..whole.start()]));
        out.push_str(&format!(
            r#"<span class="tok-{}">{}</span>"#,
            class,
            escape_html(whole.as_str())
        ));
        last = whole.end();
    }

    out.push_str(&escape_html(&line[last..]));
    out
}
