use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// Page setup shared by every PDF backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintStyles {
    /// CSS page size (e.g. "A4", "letter").
    pub page_size: String,

    /// CSS page margin (e.g. "0", "10mm").
    pub margin: String,

    /// Fallback body font stack.
    pub font_family: String,
}

impl Default for PrintStyles {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            margin: "0".to_string(),
            font_family: "Arial, sans-serif".to_string(),
        }
    }
}

impl PrintStyles {
    /// The stylesheet injected into every PDF render.
    pub fn stylesheet(&self) -> String {
        format!(
            r#"@page {{
    size: {size};
    margin: {margin};
}}
body {{
    margin: 0;
    padding: 0;
    font-family: {font};
    width: 100%;
    overflow: hidden;
    hyphens: none;
}}
* {{
    -webkit-print-color-adjust: exact;
    print-color-adjust: exact;
    color-adjust: exact;
}}
img {{
    max-width: 100%;
    height: auto;
}}
table {{
    border-collapse: collapse;
    width: 100%;
}}
"#,
            size = self.page_size,
            margin = self.margin,
            font = self.font_family,
        )
    }
}

/// `@font-face` rules for the font files found in a directory.
#[derive(Debug, Clone, Default)]
pub struct FontConfiguration {
    pub families: Vec<String>,
    pub css: String,
}

const FONT_EXTENSIONS: &[(&str, &str)] = &[
    ("ttf", "truetype"),
    ("otf", "opentype"),
    ("woff", "woff"),
    ("woff2", "woff2"),
];

impl FontConfiguration {
    /// Scan `dir` for font files. Each file becomes one family named after
    /// its file stem. A missing or unreadable directory yields an empty
    /// configuration.
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::default();
        };
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "font directory unreadable");
                return Self::default();
            }
        };

        let mut fonts: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|path| {
                let ext = path.extension()?.to_str()?.to_ascii_lowercase();
                let format = FONT_EXTENSIONS
                    .iter()
                    .find(|(known, _)| *known == ext)
                    .map(|(_, format)| *format)?;
                let family = path.file_stem()?.to_str()?.to_string();
                let url = Url::from_file_path(&path).ok()?;
                Some((family, url, format))
            })
            .collect();
        fonts.sort_by(|a, b| a.0.cmp(&b.0));

        let mut config = Self::default();
        for (family, url, format) in fonts {
            config.css.push_str(&format!(
                "@font-face {{\n    font-family: \"{family}\";\n    src: url(\"{url}\") format(\"{format}\");\n}}\n"
            ));
            config.families.push(family);
        }
        tracing::info!(fonts = config.families.len(), dir = %dir.display(), "font configuration built");
        config
    }
}
