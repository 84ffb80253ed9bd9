//! Directory listing rendering for `LIST`/`NLST`/`MLSD`/`MLST`.

use chrono::{DateTime, Utc};
use std::path::Path;

/// One directory entry plus the metadata needed to render it.
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

pub async fn read_dir(path: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(path).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let meta = entry.metadata().await?;
        let modified: DateTime<Utc> = meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH).into();
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().to_string(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            modified,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Unix `ls -l`-style rendering, the conventional `LIST` format.
pub fn format_list(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries {
        let kind = if e.is_dir { 'd' } else { '-' };
        out.push_str(&format!(
            "{}rw-r--r-- 1 ftp ftp {:>12} {} {}\r\n",
            kind,
            e.size,
            e.modified.format("%b %d %H:%M"),
            e.name
        ));
    }
    out
}

/// `NLST`: names only, one per line.
pub fn format_nlst(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&e.name);
        out.push_str("\r\n");
    }
    out
}

/// `MLSD`/`MLST`: RFC 3659 machine-parsable facts.
pub fn format_mlsx(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries {
        let entry_type = if e.is_dir { "dir" } else { "file" };
        let perm = if e.is_dir { "el" } else { "r" };
        out.push_str(&format!(
            "type={};size={};modify={};perm={}; {}\r\n",
            entry_type,
            e.size,
            e.modified.format("%Y%m%d%H%M%S"),
            perm,
            e.name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entry> {
        vec![Entry {
            name: "a.txt".to_string(),
            is_dir: false,
            size: 42,
            modified: Utc::now(),
        }]
    }

    #[test]
    fn nlst_lists_names_only() {
        assert_eq!(format_nlst(&sample()), "a.txt\r\n");
    }

    #[test]
    fn mlsx_includes_size_fact() {
        assert!(format_mlsx(&sample()).contains("size=42"));
    }

    #[test]
    fn mlsx_line_has_perm_fact_and_single_space_before_name() {
        let line = format_mlsx(&sample());
        assert!(line.contains("perm=r;"));
        assert!(line.ends_with("; a.txt\r\n"));
        assert!(!line.ends_with(";  a.txt\r\n"));
    }
}
