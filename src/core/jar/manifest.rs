// ─── Jar Manifest ───
// Main-section reader/writer for META-INF/MANIFEST.MF.

use std::io::Read;
use std::path::Path;

use crate::core::error::{InstallerError, InstallerResult};

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub const MANIFEST_VERSION: &str = "Manifest-Version";
pub const MAIN_CLASS: &str = "Main-Class";
pub const CLASS_PATH: &str = "Class-Path";

/// Physical line limit in bytes, continuation lines included.
const MAX_LINE_BYTES: usize = 72;

/// Main attributes of a manifest, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    attributes: Vec<(String, String)>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            attributes: vec![(MANIFEST_VERSION.to_string(), "1.0".to_string())],
        }
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace or append an attribute. Names compare case-insensitively.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the main section, joining continuation lines.
    pub fn parse(text: &str) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }

            if let Some(rest) = line.strip_prefix(' ') {
                if let Some((_, value)) = attributes.last_mut() {
                    value.push_str(rest);
                }
                continue;
            }

            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                attributes.push((name.trim().to_string(), value.to_string()));
            }
        }

        Self { attributes }
    }

    /// Serialized form: CRLF endings, 72-byte wrapping, blank line terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (name, value) in &self.attributes {
            write_wrapped(&mut out, &format!("{name}: {value}"));
        }
        out.push_str("\r\n");
        out.into_bytes()
    }
}

fn write_wrapped(out: &mut String, line: &str) {
    let mut current = 0usize;
    for ch in line.chars() {
        if current + ch.len_utf8() > MAX_LINE_BYTES {
            out.push_str("\r\n ");
            current = 1;
        }
        out.push(ch);
        current += ch.len_utf8();
    }
    out.push_str("\r\n");
}

/// `Main-Class` declared by a jar's manifest, `None` if the jar has no manifest or no such attribute.
pub fn read_manifest_main_class(jar: &Path) -> InstallerResult<Option<String>> {
    let file = std::fs::File::open(jar).map_err(|e| InstallerError::io(jar, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| InstallerError::local_archive(jar, e))?;

    let mut entry = match archive.by_name(MANIFEST_PATH) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(InstallerError::local_archive(jar, e)),
    };

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| InstallerError::local_archive(jar, e))?;

    let manifest = Manifest::parse(&String::from_utf8_lossy(&bytes));
    Ok(manifest
        .get(MAIN_CLASS)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::write_jar;

    #[test]
    fn version_comes_first_and_section_ends_with_blank_line() {
        let mut m = Manifest::new();
        m.set(MAIN_CLASS, "net.fabricmc.loader.launch.server.FabricServerLauncher");
        let text = String::from_utf8(m.to_bytes()).unwrap();
        assert_eq!(
            text,
            "Manifest-Version: 1.0\r\nMain-Class: net.fabricmc.loader.launch.server.FabricServerLauncher\r\n\r\n"
        );
    }

    #[test]
    fn long_values_wrap_at_72_bytes_and_parse_back() {
        let class_path = (0..20)
            .map(|i| format!("libraries/org/example/lib{i}/1.0/lib{i}-1.0.jar"))
            .collect::<Vec<_>>()
            .join(" ");
        let mut m = Manifest::new();
        m.set(CLASS_PATH, class_path.clone());

        let text = String::from_utf8(m.to_bytes()).unwrap();
        assert!(text.split("\r\n").all(|line| line.len() <= 72));
        assert_eq!(Manifest::parse(&text).get(CLASS_PATH), Some(class_path.as_str()));
    }

    #[test]
    fn set_replaces_case_insensitively() {
        let mut m = Manifest::new();
        m.set("main-class", "a.B");
        m.set(MAIN_CLASS, "c.D");
        assert_eq!(m.get(MAIN_CLASS), Some("c.D"));

        let text = String::from_utf8(m.to_bytes()).unwrap();
        assert!(!text.contains("a.B"));
        assert_eq!(text.lines().filter(|l| !l.is_empty()).count(), 2);
    }

    #[test]
    fn parse_stops_at_first_section() {
        let text = "Manifest-Version: 1.0\nMain-Class: a.b.C\n\nName: x/\nMain-Class: wrong\n";
        assert_eq!(Manifest::parse(text).get(MAIN_CLASS), Some("a.b.C"));
    }

    #[test]
    fn reads_main_class_from_jar() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("loader.jar");
        write_jar(
            &jar,
            &[(
                MANIFEST_PATH,
                b"Manifest-Version: 1.0\r\nMain-Class: net.fabricmc.loader.impl.launch.serv\r\n er.FabricServerLauncher\r\n\r\n",
            )],
        );
        assert_eq!(
            read_manifest_main_class(&jar).unwrap().as_deref(),
            Some("net.fabricmc.loader.impl.launch.server.FabricServerLauncher")
        );

        let bare = dir.path().join("bare.jar");
        write_jar(&bare, &[("a.txt", b"a")]);
        assert_eq!(read_manifest_main_class(&bare).unwrap(), None);
    }
}
