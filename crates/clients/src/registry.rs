use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use config::ClientsConfig;

use crate::{ClientDefaults, ClientRecord, RegistryError};

type ClientMap = HashMap<String, Arc<ClientRecord>>;

/// In-memory view of the client configuration directory.
///
/// Readers get an immutable snapshot. Loads build a complete replacement map before
/// publishing it, so a reader never observes a half-loaded or transiently empty registry.
pub struct ClientRegistry {
    config_dir: PathBuf,
    defaults: ClientDefaults,
    clients: RwLock<Arc<ClientMap>>,
}

struct Scan {
    clients: ClientMap,
    loaded: usize,
}

impl ClientRegistry {
    pub fn new(config: &ClientsConfig, defaults: ClientDefaults) -> Self {
        Self {
            config_dir: config.config_dir.clone(),
            defaults,
            clients: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Reads every client file and merges the records over the current ones.
    ///
    /// Returns the number of files that parsed.
    pub fn load(&self) -> Result<usize, RegistryError> {
        let scan = self.scan()?;

        let mut guard = self.clients.write().unwrap_or_else(|e| e.into_inner());
        let mut merged = ClientMap::clone(&guard);
        merged.extend(scan.clients);
        *guard = Arc::new(merged);

        Ok(scan.loaded)
    }

    /// Reads every client file and replaces the current records with them. Clients whose files
    /// are gone disappear.
    pub fn reload(&self) -> Result<usize, RegistryError> {
        let scan = self.scan()?;

        *self.clients.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(scan.clients);

        Ok(scan.loaded)
    }

    pub fn get(&self, client_id: &str) -> Option<Arc<ClientRecord>> {
        self.snapshot().get(client_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn snapshot(&self) -> Arc<HashMap<String, Arc<ClientRecord>>> {
        self.clients.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn scan(&self) -> Result<Scan, RegistryError> {
        let io_error = |source| RegistryError::Io {
            path: self.config_dir.clone(),
            source,
        };

        std::fs::create_dir_all(&self.config_dir).map_err(io_error)?;

        let mut paths = Vec::new();

        for entry in std::fs::read_dir(&self.config_dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();

            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut clients = ClientMap::new();
        let mut origins: HashMap<String, PathBuf> = HashMap::new();
        let mut loaded = 0;

        for path in paths {
            let record = match self.read_record(&path) {
                Ok(record) => record,
                Err(error) => {
                    log::error!("Error loading client configuration from {}: {error}", path.display());
                    continue;
                }
            };

            log::info!("Loaded client configuration: {}", record.client_id);

            if let Some(previous) = origins.insert(record.client_id.clone(), path.clone()) {
                log::warn!(
                    "Client '{}' from {} is shadowed by {}",
                    record.client_id,
                    previous.display(),
                    path.display()
                );
            }

            clients.insert(record.client_id.clone(), Arc::new(record));
            loaded += 1;
        }

        log::info!("Loaded {loaded} client configurations");

        Ok(Scan { clients, loaded })
    }

    fn read_record(&self, path: &Path) -> Result<ClientRecord, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        ClientRecord::from_json(&content, &self.defaults).map_err(|e| e.to_string())
    }
}
