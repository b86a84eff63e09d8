//! Printing listed entries

use clap::ValueEnum;
use pkglist_manifest::{Entry, Source};
use serde::Serialize;
use std::path::Path;

/// How `list` prints its result
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One manifest line per entry
    #[default]
    Text,
    /// A JSON array with the kind, name and origin of every entry
    Json,
}

#[derive(Serialize)]
struct EntryRecord<'e> {
    kind: String,
    line: String,
    name: Option<&'e str>,
    source: Option<&'e Source>,
}

/// Render `entries` in `format`, with paths relative to `base`.
pub fn render_entries(
    entries: &[Entry],
    format: OutputFormat,
    base: &Path,
) -> Result<String, String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for entry in entries {
                out.push_str(&entry.render_relative_to(base));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let records: Vec<EntryRecord<'_>> = entries
                .iter()
                .map(|entry| EntryRecord {
                    kind: entry.kind().to_string(),
                    line: entry.render_relative_to(base),
                    name: entry.canonical_name(),
                    source: entry.source(),
                })
                .collect();
            let mut out = serde_json::to_string_pretty(&records)
                .map_err(|e| format!("Failed to serialize entries: {}", e))?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkglist_manifest::parse_requirements;

    fn entries(lines: &[&str]) -> Vec<Entry> {
        let source = Source::file("/work/requirements.txt");
        parse_requirements(Some(source), lines.iter().copied())
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default()
    }

    #[test]
    fn test_text_output_is_one_line_per_entry() -> Result<(), String> {
        let entries = entries(&["-r /work/base.txt", "django==1.0", "six"]);
        assert_eq!(entries.len(), 3);

        let out = render_entries(&entries, OutputFormat::Text, Path::new("/work"))?;
        assert_eq!(out, "-r base.txt\ndjango==1.0\nsix\n");
        Ok(())
    }

    #[test]
    fn test_text_output_for_nothing_is_empty() -> Result<(), String> {
        assert_eq!(
            render_entries(&[], OutputFormat::Text, Path::new("/work"))?,
            ""
        );
        Ok(())
    }

    #[test]
    fn test_json_output_records() -> Result<(), Box<dyn std::error::Error>> {
        let entries = entries(&["-i https://pypi.org/simple", "django==1.0"]);
        let out = render_entries(&entries, OutputFormat::Json, Path::new("/work"))?;
        let value: serde_json::Value = serde_json::from_str(&out)?;

        assert_eq!(value[0]["kind"], "index-url");
        assert_eq!(value[0]["name"], serde_json::Value::Null);
        assert_eq!(value[1]["kind"], "package");
        assert_eq!(value[1]["line"], "django==1.0");
        assert_eq!(value[1]["name"], "django");
        assert_eq!(value[1]["source"]["path"], "/work/requirements.txt");
        assert_eq!(value[1]["source"]["line_number"], 2);
        Ok(())
    }
}
