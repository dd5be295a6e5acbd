use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{public_url, ObjectStore, StorageError, StoredObject};

/// In-process store for tests, able to fail after a number of uploads.
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    /// Uploads still allowed to succeed
    remaining_puts: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            remaining_puts: AtomicUsize::new(usize::MAX),
        }
    }
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// Accept `puts` uploads, then fail every further one
    pub fn failing_after(puts: usize) -> Self {
        let store = Self::default();
        store.remaining_puts.store(puts, Ordering::SeqCst);
        store
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let allowed = self
            .remaining_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(StorageError::Upload {
                key: key.to_string(),
                reason: "simulated failure".to_string(),
            });
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));

        Ok(StoredObject {
            key: key.to_string(),
            location: public_url(None, "test-bucket", key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
