use std::io::{self, Read};

use indexmap::{IndexMap, IndexSet};

/// Directory holding service-provider registration files.
pub const SERVICES_DIR: &str = "META-INF/services/";

/// Registration files collected across every merged jar.
///
/// Each path keeps the union of all contributed provider lines, in the order
/// they were first seen. Paths are emitted in first-contribution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationFiles {
    files: IndexMap<String, IndexSet<String>>,
}

impl RegistrationFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// `META-INF/services/<name>` with nothing nested below.
    pub fn is_registration_path(path: &str) -> bool {
        path.strip_prefix(SERVICES_DIR)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
    }

    /// Strip a `#` comment and surrounding whitespace; `None` when nothing remains.
    pub fn clean_line(line: &str) -> Option<&str> {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let line = line.trim();
        (!line.is_empty()).then_some(line)
    }

    /// Fold one jar's copy of `path` into the collection.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line.
    ///
    /// Returns how many previously unseen lines it added. A file contributing
    /// no provider lines leaves no trace.
    pub fn merge(&mut self, path: &str, mut reader: impl Read) -> io::Result<usize> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);

        let mut added = 0;
        for line in text.split(['\r', '\n']).filter_map(Self::clean_line) {
            let providers = self.files.entry(path.to_string()).or_default();
            if providers.insert(line.to_string()) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<Vec<&str>> {
        self.files
            .get(path)
            .map(|lines| lines.iter().map(String::as_str).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.files.iter().map(|(path, lines)| (path.as_str(), lines))
    }

    /// One provider per line, each newline-terminated.
    pub fn render(lines: &IndexSet<String>) -> Vec<u8> {
        let mut out = String::new();
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out.into_bytes()
    }
}
