use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use sarf_core::{canonical_root, CoreError, Generated, MorphologyContext, Validation};
use sarf_index::{DerivedWord, RootEntry, Scheme};
use sarf_morph::{CategoryCatalog, MorphError, RuleTable};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const RULES_FILE: &str = "irregular_rules.txt";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const SNAPSHOT_FILE: &str = "snapshot.json";
pub const JOURNAL_FILE: &str = "journal.jsonl";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("category metadata error: {0}")]
    Metadata(#[from] MorphError),

    #[error("journal line {line} is corrupt: {source}")]
    CorruptJournal {
        line: usize,
        source: serde_json::Error,
    },
}

/// Where the service keeps its state. Explicit rule and category files
/// override the ones inside `data_dir` and must exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageOptions {
    pub data_dir: PathBuf,
    pub rules_file: Option<PathBuf>,
    pub categories_file: Option<PathBuf>,
}

impl StorageOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            rules_file: None,
            categories_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JournalOp {
    AddRoot {
        root: String,
    },
    AddScheme {
        scheme: Scheme,
    },
    RecordWord {
        root: String,
        word: String,
        scheme_id: Option<String>,
    },
}

/// One journal line. `seq` increases across compactions so a snapshot can
/// tell which lines it already holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub seq: u64,
    pub op: JournalOp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRoot {
    pub root: String,
    pub derived_words: Vec<DerivedWord>,
}

/// Full state at compaction time. Categories are not stored; they are
/// recomputed from the root string on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    /// Highest journal sequence folded into this snapshot.
    #[serde(default)]
    pub last_seq: u64,
    pub roots: Vec<SnapshotRoot>,
    pub schemes: Vec<Scheme>,
}

#[derive(Debug)]
pub struct Storage {
    options: StorageOptions,
    context: MorphologyContext,
    journal_entries: usize,
    last_seq: u64,
}

impl Storage {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with(StorageOptions::new(data_dir.as_ref()))
    }

    pub fn open_with(options: StorageOptions) -> Result<Self, StorageError> {
        fs::create_dir_all(&options.data_dir)?;
        let rules = load_rules(&options)?;
        let catalog = load_catalog(&options)?;

        let mut storage = Self {
            options,
            context: MorphologyContext::new(rules, catalog),
            journal_entries: 0,
            last_seq: 0,
        };
        storage.load_snapshot()?;
        storage.replay_journal()?;
        storage.emit_gauges();

        info!(
            data_dir = %storage.options.data_dir.display(),
            roots = storage.context.root_count(),
            schemes = storage.context.schemes().len(),
            journal_entries = storage.journal_entries,
            "storage opened"
        );
        Ok(storage)
    }

    pub fn context(&self) -> &MorphologyContext {
        &self.context
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    /// Journal lines written since the last compaction.
    pub fn journal_len(&self) -> usize {
        self.journal_entries
    }

    pub fn add_root(&mut self, root: &str) -> Result<RootEntry, StorageError> {
        let existed = self.context.lookup_root(root).is_some();
        let entry = self.context.add_root(root)?.clone();
        self.append_journal(JournalOp::AddRoot {
            root: entry.root.clone(),
        })?;

        if !existed {
            counter!("sarf_roots_added_total").increment(1);
            self.emit_gauges();
        }
        info!(root = %entry.root, category = %entry.category, existed, "root added");
        Ok(entry)
    }

    pub fn add_scheme(&mut self, scheme: Scheme) -> Result<Option<Scheme>, StorageError> {
        let replaced = self.context.add_scheme(scheme.clone())?;
        info!(scheme = %scheme.id, replaced = replaced.is_some(), "scheme registered");
        self.append_journal(JournalOp::AddScheme { scheme })?;
        counter!("sarf_schemes_added_total").increment(1);
        Ok(replaced)
    }

    pub fn generate(&mut self, root: &str, scheme_id: &str) -> Result<Generated, StorageError> {
        let generated = self.context.generate(root, scheme_id)?;
        self.append_journal(JournalOp::RecordWord {
            root: generated.root.clone(),
            word: generated.word.clone(),
            scheme_id: Some(generated.scheme_id.clone()),
        })?;
        counter!("sarf_generate_total").increment(1);
        debug!(
            root = %generated.root,
            scheme = %generated.scheme_id,
            word = %generated.word,
            frequency = generated.frequency,
            "word generated"
        );
        Ok(generated)
    }

    pub fn validate(&mut self, word: &str, root: &str) -> Result<Validation, StorageError> {
        let validation = self.context.validate(word, root)?;
        if let (Some(scheme_id), Some(generated)) =
            (&validation.matched_scheme_id, &validation.generated)
        {
            debug!(word, generated = %generated, "recording validated spelling");
            self.append_journal(JournalOp::RecordWord {
                root: canonical_root(root)?,
                word: word.trim().to_string(),
                scheme_id: Some(scheme_id.clone()),
            })?;
        }
        counter!("sarf_validate_total", "valid" => validation.is_valid.to_string()).increment(1);
        debug!(word, root, valid = validation.is_valid, "word validated");
        Ok(validation)
    }

    /// Re-read the irregular rule table from disk (or fall back to the
    /// built-in one) and swap it in.
    pub fn reload_rules(&mut self) -> Result<usize, StorageError> {
        let rules = load_rules(&self.options)?;
        let count = rules.len();
        self.context.set_rules(rules);
        Ok(count)
    }

    /// Write a snapshot of the current state and truncate the journal.
    pub fn compact(&mut self) -> Result<(), StorageError> {
        let snapshot = Snapshot {
            saved_at: Utc::now(),
            last_seq: self.last_seq,
            roots: self
                .context
                .roots()
                .into_iter()
                .map(|entry| SnapshotRoot {
                    root: entry.root.clone(),
                    derived_words: entry.derived_words.clone(),
                })
                .collect(),
            schemes: self.context.schemes().into_iter().cloned().collect(),
        };

        let tmp_path = self.path(SNAPSHOT_FILE).with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path)?;
            serde_json::to_writer_pretty(&mut file, &snapshot)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, self.path(SNAPSHOT_FILE))?;
        File::create(self.path(JOURNAL_FILE))?;

        info!(
            roots = snapshot.roots.len(),
            schemes = snapshot.schemes.len(),
            folded = self.journal_entries,
            last_seq = snapshot.last_seq,
            "journal compacted"
        );
        self.journal_entries = 0;
        Ok(())
    }

    fn load_snapshot(&mut self) -> Result<(), StorageError> {
        let path = self.path(SNAPSHOT_FILE);
        if !path.exists() {
            debug!("no snapshot, seeding defaults");
            self.context.seed_defaults();
            return Ok(());
        }

        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
        for root in snapshot.roots {
            self.context.restore_root(&root.root, root.derived_words)?;
        }
        for scheme in snapshot.schemes {
            self.context.add_scheme(scheme)?;
        }
        self.last_seq = snapshot.last_seq;
        debug!(saved_at = %snapshot.saved_at, last_seq = snapshot.last_seq, "snapshot loaded");
        Ok(())
    }

    fn replay_journal(&mut self) -> Result<(), StorageError> {
        let path = self.path(JOURNAL_FILE);
        if !path.exists() {
            return Ok(());
        }
        let folded = self.last_seq;
        let mut skipped = 0usize;
        let reader = BufReader::new(File::open(&path)?);
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry = serde_json::from_str(&line)
                .map_err(|source| StorageError::CorruptJournal {
                    line: idx + 1,
                    source,
                })?;
            // already folded into the snapshot by an interrupted compaction
            if entry.seq != 0 && entry.seq <= folded {
                skipped += 1;
                continue;
            }
            self.apply(entry.op)?;
            self.journal_entries += 1;
            self.last_seq = self.last_seq.max(entry.seq);
        }
        if skipped > 0 {
            warn!(skipped, last_seq = folded, "skipped journal lines already in the snapshot");
        }
        Ok(())
    }

    fn apply(&mut self, op: JournalOp) -> Result<(), StorageError> {
        match op {
            JournalOp::AddRoot { root } => {
                self.context.add_root(&root)?;
            }
            JournalOp::AddScheme { scheme } => {
                self.context.add_scheme(scheme)?;
            }
            JournalOp::RecordWord {
                root,
                word,
                scheme_id,
            } => {
                self.context.record_word(&root, &word, scheme_id.as_deref())?;
            }
        }
        Ok(())
    }

    fn append_journal(&mut self, op: JournalOp) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(JOURNAL_FILE))?;
        let seq = self.last_seq + 1;
        let line = serde_json::to_string(&JournalEntry { seq, op })?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        self.last_seq = seq;
        self.journal_entries += 1;
        Ok(())
    }

    fn emit_gauges(&self) {
        gauge!("sarf_roots").set(self.context.root_count() as f64);
    }

    fn path(&self, name: &str) -> PathBuf {
        self.options.data_dir.join(name)
    }
}

fn load_rules(options: &StorageOptions) -> Result<RuleTable, StorageError> {
    let (path, required) = match &options.rules_file {
        Some(path) => (path.clone(), true),
        None => (options.data_dir.join(RULES_FILE), false),
    };
    if !required && !path.exists() {
        debug!("using built-in irregular rules");
        return Ok(RuleTable::builtin());
    }

    let rules = RuleTable::from_file(&path)?;
    for diagnostic in rules.diagnostics() {
        warn!(
            file = %path.display(),
            line = diagnostic.line,
            text = %diagnostic.text,
            error = %diagnostic.error,
            "rejected irregular rule"
        );
    }
    info!(file = %path.display(), rules = rules.len(), "irregular rules loaded");
    Ok(rules)
}

fn load_catalog(options: &StorageOptions) -> Result<CategoryCatalog, StorageError> {
    let (path, required) = match &options.categories_file {
        Some(path) => (path.clone(), true),
        None => (options.data_dir.join(CATEGORIES_FILE), false),
    };
    if !required && !path.exists() {
        return Ok(CategoryCatalog::builtin());
    }
    let catalog = CategoryCatalog::from_file(&path)?;
    info!(file = %path.display(), categories = catalog.len(), "category metadata loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_directory_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        assert_eq!(storage.context().root_count(), 4);
        assert_eq!(storage.context().schemes().len(), 5);
        assert_eq!(storage.journal_len(), 0);
        assert!(!dir.path().join(SNAPSHOT_FILE).exists());
    }

    #[test]
    fn mutations_append_one_line_each() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = Storage::open(dir.path()).unwrap();
        storage.add_root("قال").unwrap();
        storage.generate("قال", "فاعل").unwrap();
        storage.validate("مكتوب", "كتب").unwrap();
        storage.validate("شيء", "كتب").unwrap();
        assert_eq!(storage.journal_len(), 3);

        let journal = fs::read_to_string(dir.path().join(JOURNAL_FILE)).unwrap();
        let entries: Vec<JournalEntry> = journal
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        let ops: Vec<JournalOp> = entries.into_iter().map(|e| e.op).collect();
        assert_eq!(
            ops[0],
            JournalOp::AddRoot {
                root: "قال".into()
            }
        );
        assert_eq!(
            ops[1],
            JournalOp::RecordWord {
                root: "قال".into(),
                word: "قائل".into(),
                scheme_id: Some("فاعل".into()),
            }
        );
    }

    #[test]
    fn failed_mutations_are_not_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = Storage::open(dir.path()).unwrap();
        assert!(matches!(
            storage.add_root("كتاب"),
            Err(StorageError::Core(CoreError::InvalidRoot(_)))
        ));
        assert!(matches!(
            storage.generate("كتب", "nope"),
            Err(StorageError::Core(CoreError::SchemeMissing(_)))
        ));
        assert_eq!(storage.journal_len(), 0);
    }

    #[test]
    fn corrupt_journal_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(JOURNAL_FILE),
            "{\"op\":{\"AddRoot\":{\"root\":\"قال\"}}}\nnot json\n",
        )
        .unwrap();
        let err = Storage::open(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::CorruptJournal { line: 2, .. }));
    }

    #[test]
    fn explicit_rule_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = StorageOptions::new(dir.path());
        options.rules_file = Some(dir.path().join("missing.txt"));
        assert!(matches!(
            Storage::open_with(options),
            Err(StorageError::Io(_))
        ));
    }
}
