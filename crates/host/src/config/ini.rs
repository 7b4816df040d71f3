//! Minimal INI reader/writer (simple key=value parsing)
//!
//! Keys are lowercased, section names keep their case. Sections and keys
//! stay in file order so rewriting the file preserves its layout.

use std::fmt;

/// One `[name]` block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a key, keeping its original position
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed INI file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text; never fails, malformed lines are skipped
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(doc.section_index(name.trim()));
                continue;
            }

            // Keys before the first header belong to no section
            let Some(index) = current else { continue };

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                doc.sections[index].set(key, unquote(value.trim()));
            }
        }

        doc
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Section by name, appended if missing
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = self.section_index(name);
        &mut self.sections[index]
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Names of sections starting with `prefix`, prefix stripped
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sections
            .iter()
            .filter_map(move |s| s.name.strip_prefix(prefix))
    }

    fn section_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.sections.iter().position(|s| s.name == name) {
            return index;
        }
        self.sections.push(Section::new(name));
        self.sections.len() - 1
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in section.entries() {
                writeln!(f, "{key} = {value}")?;
            }
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_comments() {
        let doc = IniDocument::parse(
            "orphan = 1\n# comment\n; another\n[general]\nProfile = \"alice\"\nnot a pair\n\n[profile:alice]\ntoken='t=1'\n",
        );

        assert_eq!(doc.get("general", "profile"), Some("alice"));
        assert_eq!(doc.get("general", "PROFILE"), Some("alice"));
        assert_eq!(doc.get("profile:alice", "token"), Some("t=1"));
        assert_eq!(doc.get("general", "orphan"), None);
        assert_eq!(doc.sections().count(), 2);
    }

    #[test]
    fn test_duplicate_sections_merge() {
        let doc = IniDocument::parse("[a]\nx = 1\ny = 2\n[b]\n[a]\nx = 3\n");
        let a = doc.section("a").unwrap();
        assert_eq!(a.get("x"), Some("3"));
        assert_eq!(a.get("y"), Some("2"));
        assert_eq!(doc.sections().count(), 2);
    }

    #[test]
    fn test_serialize_layout() {
        let mut doc = IniDocument::new();
        doc.set("general", "profile", "alice");
        doc.set("profile:alice", "token", "t");
        doc.set("general", "api_root", "https://api.novem.io/v1/");

        assert_eq!(
            doc.to_string(),
            "[general]\nprofile = alice\napi_root = https://api.novem.io/v1/\n\n[profile:alice]\ntoken = t\n"
        );
        assert_eq!(IniDocument::parse(&doc.to_string()), doc);
    }

    #[test]
    fn test_names_with_prefix() {
        let doc = IniDocument::parse("[profile:b]\n[general]\n[profile:a]\n");
        let names: Vec<&str> = doc.names_with_prefix("profile:").collect();
        assert_eq!(names, ["b", "a"]);
    }
}
