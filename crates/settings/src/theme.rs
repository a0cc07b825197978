use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tmstyle_highlight::{build_rules, ScopeSource, Stylesheet};
use tracing::{debug, trace};

use crate::plist::{self, Element};

/// Scope-to-attribute lookup extracted from a TextMate `.tmTheme` file.
///
/// The editor-wide background and text colors are kept apart from the scope
/// table, so a scope can never shadow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSettings {
    editor_background: String,
    text_color: String,
    scopes: BTreeMap<String, Vec<String>>,
    skipped: Vec<(usize, EntrySkip)>,
}

impl ScopeSettings {
    /// Reads and parses a TextMate `.tmTheme` file.
    /// 讀取並解析 TextMate `.tmTheme` 檔案。
    ///
    /// The file is decoded according to its XML declaration, so Latin-1 and
    /// other declared encodings load as well as UTF-8.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThemeLoadError> {
        let path = path.as_ref();
        let contents = fs::read(path)?;
        let settings = Self::from_plist_bytes(&contents)?;
        debug!(
            path = %path.display(),
            scopes = settings.scopes.len(),
            skipped = settings.skipped.len(),
            "loaded theme"
        );
        Ok(settings)
    }

    pub fn from_plist_str(input: &str) -> Result<Self, ThemeLoadError> {
        let root = plist::parse(input)?;
        Self::from_element(&root)
    }

    /// Parses an undecoded property list.
    /// 解析尚未解碼的屬性清單位元組。
    pub fn from_plist_bytes(input: &[u8]) -> Result<Self, ThemeLoadError> {
        let root = plist::parse_bytes(input)?;
        Self::from_element(&root)
    }

    fn from_element(root: &Element) -> Result<Self, ThemeLoadError> {
        let array = if root.name() == "array" {
            root
        } else {
            root.find("array")
                .ok_or(ThemeLoadError::MissingSettingsArray)?
        };

        let mut entries = array.child_elements("dict");
        let editor = entries
            .next()
            .and_then(|entry| entry.find("dict"))
            .ok_or(ThemeLoadError::MissingEditorSettings)?;
        let (editor_background, text_color) = read_editor_colors(editor)?;

        let mut settings = ScopeSettings {
            editor_background,
            text_color,
            ..ScopeSettings::default()
        };

        for (offset, entry) in entries.enumerate() {
            // Entry 0 is the editor block consumed above.
            let index = offset + 1;
            match read_scope_entry(entry) {
                Ok(entry) => settings.register(entry),
                Err(reason) => {
                    debug!(index, %reason, "skipping theme entry");
                    settings.skipped.push((index, reason));
                }
            }
        }

        Ok(settings)
    }

    fn register(&mut self, entry: ScopeEntry) {
        for scope in entry.scopes {
            trace!(%scope, attributes = ?entry.attributes, "registered scope");
            self.scopes.insert(scope, entry.attributes.clone());
        }
    }

    pub fn editor_background(&self) -> &str {
        &self.editor_background
    }

    pub fn text_color(&self) -> &str {
        &self.text_color
    }

    /// Attribute strings for `scope`, or an empty slice when the theme does not
    /// define it.
    pub fn scope(&self, scope: &str) -> &[String] {
        self.scopes.get(scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries that were skipped, with their position in the settings array.
    pub fn skipped(&self) -> &[(usize, EntrySkip)] {
        &self.skipped
    }

    /// Builds the highlighter stylesheet for this theme.
    pub fn to_stylesheet(&self) -> Stylesheet {
        Stylesheet::new(
            self.editor_background.as_str(),
            self.text_color.as_str(),
            build_rules(self),
        )
    }
}

impl ScopeSource for ScopeSettings {
    fn scope(&self, scope: &str) -> &[String] {
        ScopeSettings::scope(self, scope)
    }

    fn text_color(&self) -> &str {
        &self.text_color
    }
}

/// One usable entry of the theme's settings array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub scopes: Vec<String>,
    pub attributes: Vec<String>,
}

/// Why a settings entry was left out of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntrySkip {
    #[error("entry has no scope string")]
    MissingScope,
    #[error("entry scope string is empty")]
    EmptyScope,
    #[error("entry has no settings dictionary")]
    MissingSettings,
}

/// Extracts the scope names and raw attributes of one settings entry.
/// 擷取單一設定項目的範圍名稱與原始屬性。
///
/// The scope is the entry's second `string` descendant; attributes are the
/// non-empty `string` values inside its first nested `dict`, trimmed.
pub fn read_scope_entry(entry: &Element) -> Result<ScopeEntry, EntrySkip> {
    let strings = entry.descendants("string");
    let scope = strings
        .get(1)
        .ok_or(EntrySkip::MissingScope)?
        .text()
        .ok_or(EntrySkip::EmptyScope)?;
    let values = entry.find("dict").ok_or(EntrySkip::MissingSettings)?;

    let attributes = values
        .descendants("string")
        .into_iter()
        .filter_map(Element::text)
        .map(|value| value.trim().to_string())
        .collect();

    Ok(ScopeEntry {
        scopes: scope.split(", ").map(str::to_string).collect(),
        attributes,
    })
}

/// Background is the first string of the editor block and the default text
/// color the third, following the key order TextMate writes.
fn read_editor_colors(editor: &Element) -> Result<(String, String), ThemeLoadError> {
    let values = editor.descendants("string");
    if values.len() < 3 {
        return Err(ThemeLoadError::MissingEditorSettings);
    }
    let text = |index: usize| values[index].text().unwrap_or_default().to_string();
    Ok((text(0), text(2)))
}

#[derive(Debug, Error)]
pub enum ThemeLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed theme XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed theme XML: {0}")]
    InvalidFormat(&'static str),
    #[error("theme has no settings array")]
    MissingSettingsArray,
    #[error("theme is missing the editor-wide settings block")]
    MissingEditorSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(xml: &str) -> Element {
        plist::parse(xml).unwrap()
    }

    #[test]
    fn reads_scope_and_trimmed_attributes() {
        let parsed = read_scope_entry(&entry(
            "<dict><key>name</key><string>Comment</string>\
             <key>scope</key><string>comment</string>\
             <key>settings</key><dict>\
             <key>fontStyle</key><string> italic </string>\
             <key>foreground</key><string>#75715E</string>\
             </dict></dict>",
        ))
        .unwrap();
        assert_eq!(parsed.scopes, vec!["comment"]);
        assert_eq!(parsed.attributes, vec!["italic", "#75715E"]);
    }

    #[test]
    fn splits_comma_separated_scopes() {
        let parsed = read_scope_entry(&entry(
            "<dict><string>Strings</string><string>string, string.quoted</string>\
             <dict><string>#E6DB74</string></dict></dict>",
        ))
        .unwrap();
        assert_eq!(parsed.scopes, vec!["string", "string.quoted"]);
    }

    #[test]
    fn empty_attribute_strings_are_dropped() {
        let parsed = read_scope_entry(&entry(
            "<dict><string>Name</string><string>keyword</string>\
             <dict><string></string><string>#F92672</string></dict></dict>",
        ))
        .unwrap();
        assert_eq!(parsed.attributes, vec!["#F92672"]);
    }

    #[test]
    fn reports_skip_reasons() {
        assert_eq!(
            read_scope_entry(&entry("<dict><string>only</string></dict>")),
            Err(EntrySkip::MissingScope)
        );
        assert_eq!(
            read_scope_entry(&entry(
                "<dict><string>a</string><string></string><dict></dict></dict>"
            )),
            Err(EntrySkip::EmptyScope)
        );
        assert_eq!(
            read_scope_entry(&entry("<dict><string>a</string><string>b</string></dict>")),
            Err(EntrySkip::MissingSettings)
        );
    }

    #[test]
    fn editor_colors_are_positional() {
        let editor = entry(
            "<dict><key>background</key><string>#272822</string>\
             <key>caret</key><string>#F8F8F0</string>\
             <key>foreground</key><string>#F8F8F2</string></dict>",
        );
        let (background, text) = read_editor_colors(&editor).unwrap();
        assert_eq!(background, "#272822");
        assert_eq!(text, "#F8F8F2");
    }

    #[test]
    fn short_editor_block_is_fatal() {
        let editor = entry("<dict><string>#272822</string></dict>");
        assert!(matches!(
            read_editor_colors(&editor),
            Err(ThemeLoadError::MissingEditorSettings)
        ));
    }

    #[test]
    fn unknown_scope_resolves_to_empty_slice() {
        let settings = ScopeSettings::default();
        assert!(settings.scope("comment").is_empty());
    }
}
