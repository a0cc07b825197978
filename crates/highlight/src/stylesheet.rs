use std::fmt;
use std::io;

use crate::theme::StyleRule;

/// Wrapper class the highlighter puts around highlighted code.
pub const CONTAINER_SELECTOR: &str = ".highlight";

/// Suffix that replaces the theme file's extension for the default output.
pub const OUTPUT_SUFFIX: &str = "-Highlight.css";

/// A complete highlighter stylesheet: one container rule followed by one
/// line per non-empty token-class rule.
/// 完整的語法突顯樣式表：先輸出容器規則，再逐行輸出非空的權杖類別規則。
#[derive(Debug, Clone)]
pub struct Stylesheet {
    background: String,
    foreground: String,
    rules: Vec<StyleRule>,
}

impl Stylesheet {
    pub fn new(
        background: impl Into<String>,
        foreground: impl Into<String>,
        rules: Vec<StyleRule>,
    ) -> Self {
        Self {
            background: background.into(),
            foreground: foreground.into(),
            rules,
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")?;
        writer.flush()
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {{ background-color: {}; color: {}; }}",
            CONTAINER_SELECTOR, self.background, self.foreground
        )?;
        for rule in self.rules.iter().filter(|rule| !rule.is_empty()) {
            writeln!(
                f,
                "{} .{} {{ {} }}",
                CONTAINER_SELECTOR,
                rule.name(),
                rule.declarations()
            )?;
        }
        Ok(())
    }
}
