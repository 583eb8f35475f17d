use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use smol_str::SmolStr;

use super::FamilyId;

static GLOBAL: Lazy<DenseIdTable> = Lazy::new(DenseIdTable::new);

/// Append-only interner from `(language, opening text)` to dense family ids.
///
/// Once issued an id never changes meaning, so readers may look ids up while
/// another caller appends.
#[derive(Default)]
pub struct DenseIdTable {
    inner: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    ids: HashMap<(SmolStr, SmolStr), FamilyId>,
    keys: Vec<(SmolStr, SmolStr)>,
}

impl DenseIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table shared by every registry.
    pub fn global() -> &'static DenseIdTable {
        &GLOBAL
    }

    pub fn intern(&self, language: &str, opening_text: &str) -> FamilyId {
        let key = (SmolStr::new(language), SmolStr::new(opening_text));
        if let Some(id) = self.inner.read().ids.get(&key) {
            return *id;
        }

        let mut table = self.inner.write();
        if let Some(id) = table.ids.get(&key) {
            return *id;
        }
        let id = FamilyId::new(table.keys.len() as u32);
        table.keys.push(key.clone());
        table.ids.insert(key, id);
        id
    }

    /// The `(language, opening text)` an id was issued for.
    pub fn key(&self, id: FamilyId) -> Option<(SmolStr, SmolStr)> {
        self.inner.read().keys.get(id.get() as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
