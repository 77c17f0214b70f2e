//! Class-id bookkeeping and `classes.txt` generation.
use clap::ValueEnum;
use dashmap::DashSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::io::write_atomically;
use crate::types::CLASSES_FILE_NAME;

/// Largest class id accepted when building `classes.txt`
pub const MAX_CLASS_ID: u32 = 65_535;

pub const DOTA_V1_CLASSES: &[&str] = &[
    "plane",
    "ship",
    "storage-tank",
    "baseball-diamond",
    "tennis-court",
    "basketball-court",
    "ground-track-field",
    "harbor",
    "bridge",
    "large-vehicle",
    "small-vehicle",
    "helicopter",
    "roundabout",
    "soccer-ball-field",
    "swimming-pool",
];

pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

// Built-in class name lists
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ClassPreset {
    /// DOTA v1 (15 classes)
    Dota,
    /// COCO (80 classes)
    Coco,
}

impl ClassPreset {
    pub fn names(self) -> &'static [&'static str] {
        match self {
            ClassPreset::Dota => DOTA_V1_CLASSES,
            ClassPreset::Coco => COCO_CLASSES,
        }
    }
}

/// Ordered class names, assigned to the sorted class ids one by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_preset(preset: ClassPreset) -> Self {
        Self::new(preset.names().iter().map(|s| s.to_string()).collect())
    }

    /// Read names from a text file, one per line. Blank lines are dropped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            return Err(ConvertError::EmptyClassNames(path.to_path_buf()));
        }
        info!(
            "Imported {} class names from {}",
            names.len(),
            path.display()
        );
        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Build the `classes.txt` rows: `max(id) + 1` entries, gaps left empty.
    ///
    /// The i-th sorted id receives the i-th name; ids beyond the supplied
    /// names, or whose name is blank, are called `class<id>`. Ids above
    /// [`MAX_CLASS_ID`] are rejected.
    pub fn table_for(&self, class_ids: &[u32]) -> Result<Vec<String>> {
        let Some(&max_id) = class_ids.iter().max() else {
            return Ok(Vec::new());
        };
        if max_id > MAX_CLASS_ID {
            return Err(ConvertError::ClassIdTooLarge {
                id: max_id,
                max: MAX_CLASS_ID,
            });
        }
        let mut sorted = class_ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        if sorted.len() > self.names.len() && !self.names.is_empty() {
            warn!(
                "{} class ids but only {} names; the rest get default names",
                sorted.len(),
                self.names.len()
            );
        }

        let mut table = vec![String::new(); max_id as usize + 1];
        for (i, id) in sorted.iter().enumerate() {
            table[*id as usize] = match self.names.get(i) {
                Some(name) if !name.trim().is_empty() => name.clone(),
                _ => format!("class{}", id),
            };
        }
        Ok(table)
    }
}

/// Gather the distinct integer class ids used across `files`, sorted.
///
/// The first token of each non-empty line is the class id; lines whose first
/// token is not an integer are ignored. Unreadable files are skipped.
pub fn collect_class_ids(files: &[PathBuf]) -> Vec<u32> {
    let ids: DashSet<u32> = DashSet::new();

    files.par_iter().for_each(|path| match fs::read_to_string(path) {
        Ok(content) => {
            for id in content.lines().filter_map(parse_class_id) {
                ids.insert(id);
            }
        }
        Err(e) => warn!("Skipping unreadable file {}: {}", path.display(), e),
    });

    let mut ids: Vec<u32> = ids.into_iter().collect();
    ids.sort_unstable();
    debug!("Collected class ids: {:?}", ids);
    ids
}

fn parse_class_id(line: &str) -> Option<u32> {
    line.split_whitespace().next()?.parse().ok()
}

/// Write `classes.txt` into `output_dir`. Returns `None` when there are no ids.
pub fn write_classes_file(
    output_dir: &Path,
    class_ids: &[u32],
    names: &ClassNames,
) -> Result<Option<PathBuf>> {
    let table = names.table_for(class_ids)?;
    if table.is_empty() {
        warn!("No class ids found; classes.txt not written");
        return Ok(None);
    }

    let mut content = String::with_capacity(table.len() * 16);
    for name in &table {
        content.push_str(name);
        content.push('\n');
    }

    let path = output_dir.join(CLASSES_FILE_NAME);
    write_atomically(&path, content.as_bytes())?;
    info!("classes.txt written to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_sizes() {
        assert_eq!(ClassPreset::Dota.names().len(), 15);
        assert_eq!(ClassPreset::Coco.names().len(), 80);
    }

    #[test]
    fn test_table_fills_gaps_and_defaults() {
        let names = ClassNames::new(vec!["plane".into(), "ship".into()]);
        let table = names.table_for(&[4, 0, 2, 0]).unwrap();
        assert_eq!(table, vec!["plane", "", "ship", "", "class4"]);
    }

    #[test]
    fn test_table_without_ids_is_empty() {
        assert!(ClassNames::default().table_for(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_blank_names_get_default_names() {
        let names = ClassNames::new(vec!["plane".into(), "".into(), "  ".into()]);
        let table = names.table_for(&[0, 1, 2]).unwrap();
        assert_eq!(table, vec!["plane", "class1", "class2"]);
    }

    #[test]
    fn test_oversized_class_id_is_rejected() {
        let names = ClassNames::default();
        assert_eq!(names.table_for(&[MAX_CLASS_ID]).unwrap().len(), 65_536);
        assert!(matches!(
            names.table_for(&[0, u32::MAX]),
            Err(ConvertError::ClassIdTooLarge { id: u32::MAX, .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let result = write_classes_file(dir.path(), &[1, 4_294_967_295], &names);
        assert!(result.is_err());
        assert!(!dir.path().join(CLASSES_FILE_NAME).exists());
    }

    #[test]
    fn test_collect_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "3 0.1 0.1 0.2 0.1 0.2 0.2 0.1 0.2\n\nfoo 1 2\n").unwrap();
        fs::write(&b, "1 0.1 0.1 0.2 0.1 0.2 0.2 0.1 0.2\n3 0 0 0 0 0 0 0 0\n").unwrap();

        let ids = collect_class_ids(&[a, b]);
        assert_eq!(ids, vec![1, 3]);

        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let path = write_classes_file(&out, &ids, &ClassNames::default())
            .unwrap()
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "\nclass1\n\nclass3\n");
    }

    #[test]
    fn test_names_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        fs::write(&path, "car\n\n  truck \n").unwrap();
        let names = ClassNames::from_file(&path).unwrap();
        assert_eq!(names, ClassNames::new(vec!["car".into(), "truck".into()]));

        fs::write(&path, "\n \n").unwrap();
        assert!(matches!(
            ClassNames::from_file(&path),
            Err(ConvertError::EmptyClassNames(_))
        ));
    }
}
