use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Overwrites any previous snapshot
        fs::write(&full_path, data).await?;
        Ok(full_path.display().to_string())
    }
}
