use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::filter::{SalaryRange, filter_vacancies};
use crate::models::PlatformVacancies;
use crate::models::platform::Catalog;
use crate::models::vacancy::Vacancy;

/// On-disk layout: platform display name to serialized vacancies.
pub type StoreData = BTreeMap<String, Vec<Value>>;

/// Result of reading the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    /// The file did not exist and an empty one was written.
    Created,
    /// The file is not valid store JSON; the buffer was left untouched.
    Malformed,
}

/// Write `data` as indented JSON, replacing the file.
///
/// Non-ASCII text is written as-is rather than escaped.
pub fn save<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), AppError> {
    let mut body = serde_json::to_string_pretty(data)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

/// JSON file backed vacancy store.
///
/// Every operation re-reads the file first and rewrites it in full after a
/// mutation. The buffer belongs to this instance only.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: StoreData::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Number of records in the buffer across all platforms.
    pub fn len(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the backing file into the buffer.
    ///
    /// A missing file is created empty. A malformed file is reported and
    /// left alone. Other I/O failures are returned.
    pub fn load(&mut self) -> Result<LoadStatus, AppError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("File {} not found, creating a new one", self.path.display());
                self.data.clear();
                save(&self.data, &self.path)?;
                return Ok(LoadStatus::Created);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<StoreData>(&text) {
            Ok(data) => {
                self.data = data;
                Ok(LoadStatus::Loaded)
            }
            Err(e) => {
                tracing::error!(
                    "File {} is not a valid vacancy JSON file: {e}",
                    self.path.display()
                );
                Ok(LoadStatus::Malformed)
            }
        }
    }

    /// Replace the file contents with `vacancies`.
    pub fn save_all(&mut self, vacancies: &PlatformVacancies) -> Result<(), AppError> {
        let mut data = StoreData::new();
        for (platform, list) in vacancies {
            let values = list
                .iter()
                .map(Vacancy::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            data.insert(platform.clone(), values);
        }

        save(&data, &self.path)?;
        self.data = data;
        tracing::info!("Saved {} vacancies to {}", self.len(), self.path.display());
        Ok(())
    }

    /// Append one vacancy to its platform bucket and rewrite the file.
    pub fn add(&mut self, vacancy: &Vacancy) -> Result<(), AppError> {
        self.load()?;
        self.data
            .entry(vacancy.platform().to_string())
            .or_default()
            .push(vacancy.to_value()?);
        save(&self.data, &self.path)
    }

    /// Record at a position in storage order (platform buckets in key
    /// order, then insertion order). This is an index, not a vacancy id.
    pub fn get(&mut self, index: usize) -> Result<Option<Value>, AppError> {
        self.load()?;
        Ok(self.data.values().flatten().nth(index).cloned())
    }

    /// Look a vacancy up by its platform and own id.
    pub fn find(&mut self, platform: &str, vacancy_id: i64) -> Result<Option<Vacancy>, AppError> {
        self.load()?;
        let Some(records) = self.data.get(platform) else {
            return Ok(None);
        };

        for record in records {
            let vacancy: Vacancy = serde_json::from_value(record.clone())?;
            if vacancy.vacancy_id() == vacancy_id {
                return Ok(Some(vacancy));
            }
        }
        Ok(None)
    }

    /// Remove the first stored record structurally equal to `vacancy`.
    ///
    /// Returns whether a record was removed. The file is rewritten either way.
    #[allow(dead_code)]
    pub fn delete(&mut self, vacancy: &Vacancy) -> Result<bool, AppError> {
        self.load()?;
        let target = vacancy.to_value()?;

        let position = self
            .data
            .get(vacancy.platform())
            .and_then(|records| records.iter().position(|record| *record == target));

        let removed = match (position, self.data.get_mut(vacancy.platform())) {
            (Some(index), Some(records)) => {
                records.remove(index);
                true
            }
            _ => {
                tracing::warn!("Vacancy \"{}\" not found", vacancy.title());
                false
            }
        };

        save(&self.data, &self.path)?;
        Ok(removed)
    }

    /// Remove the record at a position in the same order [`Self::get`] uses.
    ///
    /// The stored value is removed as-is, so records that would not survive
    /// a rebuild into a [`Vacancy`] can still be deleted. The file is only
    /// rewritten when something was removed.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Value>, AppError> {
        self.load()?;

        let mut offset = index;
        let mut removed = None;
        for records in self.data.values_mut() {
            if offset < records.len() {
                removed = Some(records.remove(offset));
                break;
            }
            offset -= records.len();
        }

        if removed.is_some() {
            save(&self.data, &self.path)?;
        }
        Ok(removed)
    }

    /// Load stored vacancies for the catalog's platforms and apply `range`.
    ///
    /// The salary filter always runs here, so unpriced vacancies are
    /// dropped even when `range` is unbounded. `count` and `keyword` are
    /// accepted for parity with a live search but do not narrow results.
    pub fn load_filtered(
        &mut self,
        catalog: &Catalog,
        _count: u32,
        _keyword: &str,
        range: &SalaryRange,
    ) -> Result<PlatformVacancies, AppError> {
        self.load()?;

        let mut result = PlatformVacancies::new();
        for (platform, records) in &self.data {
            if !catalog.contains_name(platform) {
                continue;
            }

            let vacancies = records
                .iter()
                .map(|record| serde_json::from_value::<Vacancy>(record.clone()))
                .collect::<Result<Vec<_>, _>>()?;

            result.insert(platform.clone(), filter_vacancies(&vacancies, range));
        }
        Ok(result)
    }
}
