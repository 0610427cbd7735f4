use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// A note chosen for annotation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnotatedNote {
    pub hadm_id: String,
    pub row_id: i64,
}

/// Read a `hadm_id,row_id` CSV into note ids by admission, keeping file order.
pub fn read_annotated_notes(path: &Path) -> anyhow::Result<BTreeMap<String, Vec<i64>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut by_adm: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for record in reader.deserialize() {
        let note: AnnotatedNote = record?;
        by_adm.entry(note.hadm_id).or_default().push(note.row_id);
    }
    Ok(by_adm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_admission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        std::fs::write(&path, "hadm_id,row_id\n100,3\n200,9\n100,1\n").unwrap();
        let notes = read_annotated_notes(&path).unwrap();
        assert_eq!(notes["100"], vec![3, 1]);
        assert_eq!(notes["200"], vec![9]);
    }
}
