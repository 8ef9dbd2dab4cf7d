// Key-value persistence for best records.
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

pub trait KeyValueStore {
    /// retrieve the text stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// write or overwrite the text stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Store that lives as long as the process. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| eyre!("in-memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| eyre!("in-memory store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys kept in one JSON object file. Every `set` rewrites the file
/// through a sibling temp file and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        write_entries(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(e).wrap_err_with(|| {
                format!("Failed to read store file {}", path.display())
            });
        }
    };
    if data.is_empty() {
        return Ok(BTreeMap::new());
    }
    match serde_json::from_slice::<BTreeMap<String, String>>(&data) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "store file is not a JSON object of strings; starting empty"
            );
            Ok(BTreeMap::new())
        }
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(entries).wrap_err("Failed to serialize store entries")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .wrap_err_with(|| format!("Failed to write store file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .wrap_err_with(|| format!("Failed to replace store file {}", path.display()))?;
    Ok(())
}
