//! Listing the covers already present in an output directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Normalized names of the `.jpg` covers in `dir`, sorted and de-duplicated.
///
/// Spaces and hyphens are stripped from each file stem so that `978-1-108
/// 78356-9.jpg` and `9781108783569.JPG` count as the same cover. Fallback
/// `page_<n>_nocode` files are skipped.
pub fn inventory<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let mut isbns = BTreeSet::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let is_jpg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg"));
        if !is_jpg {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            log::debug!("Skipping non UTF-8 file name {}", path.display());
            continue;
        };
        if stem.ends_with("_nocode") {
            continue;
        }

        let key: String = stem
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !key.is_empty() {
            isbns.insert(key);
        }
    }

    Ok(isbns.into_iter().collect())
}
