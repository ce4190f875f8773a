/// Assay column registry shared by peak tagging and the activity matrix
use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Ordered, append-only mapping from assay name to column index
#[derive(Debug, Clone, Default)]
pub struct AssayIndex {
    names: IndexSet<String>,
}

impl AssayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index with the columns of an existing activity table
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = AssayIndex::new();
        for name in names {
            index.push(name)?;
        }
        Ok(index)
    }

    /// Append a new assay and return its column index
    pub fn push<S: Into<String>>(&mut self, name: S) -> Result<usize> {
        let name = name.into();
        let (id, inserted) = self.names.insert_full(name);
        if !inserted {
            bail!("Duplicate assay name '{}'", self.names[id]);
        }
        Ok(id)
    }

    pub fn get_id(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn get_name(&self, id: usize) -> Option<&str> {
        self.names.get_index(id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in column order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|s| s.as_str())
    }
}

/// One manifest row: an assay and the BED file holding its peaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssayBed {
    pub name: String,
    pub bed_path: PathBuf,
}

/// Read `name<TAB>bed_path` rows
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<AssayBed>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open assay manifest: {}", path.display()))?;

    let mut assays = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 || fields[1].is_empty() {
            bail!(
                "{}:{}: expected 'assay_name<TAB>bed_path'",
                path.display(),
                line_no + 1
            );
        }

        assays.push(AssayBed {
            name: fields[0].to_string(),
            bed_path: PathBuf::from(fields[1]),
        });
    }

    Ok(assays)
}

/// Assay names from the header row of an existing activity table
pub fn read_activity_header<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open activity table: {}", path.display()))?;

    let mut header = String::new();
    BufReader::new(file).read_line(&mut header)?;
    let header = header.trim_end_matches(['\n', '\r']);
    if header.is_empty() {
        bail!("Activity table {} has no header row", path.display());
    }

    Ok(header.split('\t').skip(1).map(|s| s.to_string()).collect())
}

/// Build the assay index: database columns first, then manifest assays in order.
///
/// Returns the index and each manifest assay's column.
pub fn assign_assay_indices(
    db_assays: Vec<String>,
    manifest: &[AssayBed],
) -> Result<(AssayIndex, Vec<usize>)> {
    let mut index = AssayIndex::from_names(db_assays)?;
    let mut columns = Vec::with_capacity(manifest.len());
    for assay in manifest {
        columns.push(index.push(assay.name.clone())?);
    }
    Ok((index, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_assay_index() {
        let mut index = AssayIndex::new();
        assert_eq!(index.push("dnase_a").unwrap(), 0);
        assert_eq!(index.push("dnase_b").unwrap(), 1);
        assert!(index.push("dnase_a").is_err());

        assert_eq!(index.get_id("dnase_b"), Some(1));
        assert_eq!(index.get_name(0), Some("dnase_a"));
        assert_eq!(index.get_name(5), None);
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["dnase_a", "dnase_b"]);
    }

    #[test]
    fn test_db_columns_come_first() {
        let manifest = vec![
            AssayBed { name: "new1".into(), bed_path: "a.bed".into() },
            AssayBed { name: "new2".into(), bed_path: "b.bed".into() },
        ];
        let (index, columns) =
            assign_assay_indices(vec!["old0".into(), "old1".into()], &manifest).unwrap();
        assert_eq!(columns, vec![2, 3]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.get_name(0), Some("old0"));
    }

    #[test]
    fn test_read_manifest() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "heart\t/data/heart.bed").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "liver\t/data/liver.bed.gz\textra").unwrap();

        let assays = read_manifest(file.path()).unwrap();
        assert_eq!(assays.len(), 2);
        assert_eq!(assays[1].name, "liver");
        assert_eq!(assays[1].bed_path, PathBuf::from("/data/liver.bed.gz"));
    }

    #[test]
    fn test_manifest_missing_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "heart").unwrap();
        assert!(read_manifest(file.path()).is_err());
    }

    #[test]
    fn test_read_activity_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\tgm12878\tk562").unwrap();
        writeln!(file, "chr1:0-600(+)\t1\t0").unwrap();

        let names = read_activity_header(file.path()).unwrap();
        assert_eq!(names, vec!["gm12878", "k562"]);
    }
}
