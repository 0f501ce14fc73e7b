use std::path::PathBuf;

use super::backend::{BackendError, PdfBackend, PdfJob};
use super::process;

pub const ENV_VAR: &str = "INFODOCS_WKHTMLTOPDF_BIN";

/// Legacy-CSS renderer backed by the `wkhtmltopdf` executable. It has no
/// user-stylesheet option, so the print stylesheet is injected into the
/// document itself.
pub struct Wkhtmltopdf {
    program: PathBuf,
    version: String,
}

impl Wkhtmltopdf {
    pub fn detect() -> Option<Self> {
        let program = process::locate(ENV_VAR, "wkhtmltopdf")?;
        let version = process::detect_version(&program, "--version")?;
        Some(Self { program, version })
    }
}

impl PdfBackend for Wkhtmltopdf {
    fn name(&self) -> &'static str {
        "wkhtmltopdf"
    }

    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    fn render_pdf(&self, html: &str, job: &PdfJob<'_>) -> Result<Vec<u8>, BackendError> {
        let document = inject_stylesheet(&strip_doctype(html), job.stylesheet);
        let mut args: Vec<String> = ["--quiet", "--encoding", "utf-8"]
            .into_iter()
            .map(String::from)
            .collect();
        args.extend(page_args(job.page_size, job.margin));
        args.extend(["--enable-local-file-access", "-", "-"].map(String::from));
        let pdf = process::run(&self.program, args, Some(document.as_bytes()))?;
        if pdf.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        Ok(pdf)
    }
}

/// Command-line options for a CSS page size (`A4`, `letter landscape`,
/// `210mm 297mm`) and margin shorthand of one to four lengths.
pub fn page_args(page_size: &str, margin: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut dimensions = Vec::new();
    for token in page_size.split_whitespace() {
        match token.to_ascii_lowercase().as_str() {
            "landscape" => args.extend(["--orientation".to_string(), "Landscape".to_string()]),
            "portrait" => args.extend(["--orientation".to_string(), "Portrait".to_string()]),
            _ => dimensions.push(token),
        }
    }
    match dimensions.as_slice() {
        [width, height] => args.extend([
            "--page-width".to_string(),
            width.to_string(),
            "--page-height".to_string(),
            height.to_string(),
        ]),
        [name] => args.extend(["--page-size".to_string(), paper_name(name)]),
        _ => args.extend(["--page-size".to_string(), "A4".to_string()]),
    }

    let lengths: Vec<&str> = margin.split_whitespace().collect();
    let (top, right, bottom, left) = match lengths.as_slice() {
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left, ..] => (*top, *right, *bottom, *left),
        [] => ("0", "0", "0", "0"),
    };
    for (flag, length) in [("-T", top), ("-R", right), ("-B", bottom), ("-L", left)] {
        args.push(flag.to_string());
        args.push(length.to_string());
    }
    args
}

/// `letter` -> `Letter`, `a4` -> `A4`.
fn paper_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Remove a leading `<!DOCTYPE ...>` declaration.
pub fn strip_doctype(html: &str) -> String {
    let trimmed = html.trim_start();
    let is_doctype = trimmed
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"));
    match (is_doctype, trimmed.find('>')) {
        (true, Some(end)) => trimmed[end + 1..].trim_start().to_string(),
        _ => html.to_string(),
    }
}

/// Insert a `<style>` element just before `</head>`, or at the top of the
/// document when it has no head.
pub fn inject_stylesheet(html: &str, stylesheet: &str) -> String {
    let style = format!("<style>\n{stylesheet}</style>\n");
    match html.to_ascii_lowercase().find("</head>") {
        Some(index) => format!("{}{style}{}", &html[..index], &html[index..]),
        None => format!("{style}{html}"),
    }
}
