use std::fs;
use std::path::PathBuf;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::ApiError;
use crate::models::Category;

/// Category persistence, behind a trait so the file-backed simulation can be
/// swapped for a real backend implementation once the API grows one.
pub trait CategoryStore {
    /// All known categories.
    fn list(&self) -> Result<Vec<Category>, ApiError>;
    /// Creates a category and returns it.
    fn add(&mut self, name: &str, color: &str) -> Result<Category, ApiError>;
    /// Removes a category by id. Returns `false` if it did not exist.
    fn remove(&mut self, id: &str) -> Result<bool, ApiError>;
}

/// Returns the path to the categories file (`categories.json`).
///
/// The path is determined in the following order:
/// 1. `TASKFLOW_CATEGORIES_FILE` environment variable.
/// 2. `~/.local/share/taskflow/categories.json` (on Linux).
/// 3. `./categories.json` (fallback).
pub fn default_categories_path() -> PathBuf {
    std::env::var("TASKFLOW_CATEGORIES_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("taskflow");
            if !p.exists() {
                let _ = fs::create_dir_all(&p);
            }
            p.push("categories.json");
            p
        })
}

/// File-backed category store. The backend has no category endpoints yet,
/// so categories live in a local JSON file.
pub struct LocalCategoryStore {
    path: PathBuf,
}

impl LocalCategoryStore {
    pub fn new(path: PathBuf) -> LocalCategoryStore {
        LocalCategoryStore { path }
    }

    pub fn open_default() -> LocalCategoryStore {
        LocalCategoryStore::new(default_categories_path())
    }

    fn load(&self) -> Vec<Category> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&data).unwrap_or_else(|_| Vec::new())
    }

    fn save(&self, categories: &[Category]) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(categories)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CategoryStore for LocalCategoryStore {
    fn list(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.load())
    }

    fn add(&mut self, name: &str, color: &str) -> Result<Category, ApiError> {
        let mut categories = self.load();
        let category = Category {
            id: generate_id(),
            name: name.to_string(),
            color: color.to_string(),
            user_id: "local".to_string(),
        };
        categories.push(category.clone());
        self.save(&categories)?;
        Ok(category)
    }

    fn remove(&mut self, id: &str) -> Result<bool, ApiError> {
        let mut categories = self.load();
        let len_before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == len_before {
            return Ok(false);
        }
        self.save(&categories)?;
        Ok(true)
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LocalCategoryStore {
        LocalCategoryStore::new(dir.path().join("categories.json"))
    }

    #[test]
    fn empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).list().unwrap().is_empty());
    }

    #[test]
    fn add_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir);
        let cat = s.add("Work", "#ff0000").unwrap();
        assert_eq!(cat.name, "Work");
        assert!(!cat.id.is_empty());

        let reopened = store(&dir);
        let listed = reopened.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, cat.id);
        assert_eq!(listed[0].color, "#ff0000");
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir);
        s.add("Home", "#00ff00").unwrap();
        assert!(!s.remove("missing").unwrap());
        assert_eq!(s.list().unwrap().len(), 1);
    }

    #[test]
    fn remove_deletes_category() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir);
        let cat = s.add("Home", "#00ff00").unwrap();
        assert!(s.remove(&cat.id).unwrap());
        assert!(s.list().unwrap().is_empty());
    }
}
