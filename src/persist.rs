use crate::legacy;
use crate::model::Selection;
use crate::store::CellStore;

/// Slot holding the serialized gradebook state.
pub const STATE_SLOT: &str = "gradebook.state";

/// Durable named-blob storage.
pub trait SlotStorage {
    fn read_slot(&self, name: &str) -> anyhow::Result<Option<String>>;
    fn write_slot(&mut self, name: &str, blob: &str) -> anyhow::Result<()>;
}

/// Best-effort mirror of the gradebook state into one slot.
///
/// Neither direction surfaces errors: a failed read yields an empty store
/// with the default selection, and a failed write is logged and dropped.
pub struct PersistenceAdapter<S: SlotStorage> {
    storage: S,
    slot: &'static str,
}

impl<S: SlotStorage> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            slot: STATE_SLOT,
        }
    }

    pub fn save(&mut self, cells: &CellStore, selection: &Selection) {
        let blob = match legacy::encode_blob(cells, selection) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("could not encode gradebook state: {e:#}");
                return;
            }
        };
        if let Err(e) = self.storage.write_slot(self.slot, &blob) {
            log::warn!("could not save gradebook state to slot {}: {e:#}", self.slot);
        }
    }

    pub fn load(&self, defaults: &Selection) -> (CellStore, Selection) {
        let text = match self.storage.read_slot(self.slot) {
            Ok(Some(v)) => v,
            Ok(None) => {
                log::debug!("no saved gradebook state; starting empty");
                return (CellStore::new(), defaults.clone());
            }
            Err(e) => {
                log::warn!("could not read gradebook state: {e:#}");
                return (CellStore::new(), defaults.clone());
            }
        };
        match legacy::decode_blob(&text, defaults) {
            Ok(decoded) => {
                if decoded.format == legacy::StoredFormat::V1Listed {
                    log::info!(
                        "migrated {} cells from listed layout; rewritten on next save",
                        decoded.cells.len()
                    );
                }
                (decoded.cells, decoded.selection)
            }
            Err(e) => {
                log::warn!("discarding unreadable gradebook state: {e:#}");
                (CellStore::new(), defaults.clone())
            }
        }
    }
}

#[cfg(test)]
pub use memory::MemorySlots;
