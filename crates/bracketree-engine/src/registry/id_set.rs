use std::fmt;
use std::rc::Rc;

use super::FamilyId;

/// An immutable set of bracket family ids.
///
/// The first 64 ids live inline; larger ids spill into a shared word array.
/// Sets are cloned into every AST node, so cloning must stay cheap.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BracketIdSet {
    low: u64,
    high: Option<Rc<[u64]>>,
}

impl BracketIdSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(id: FamilyId) -> Self {
        Self::empty().with(id)
    }

    pub fn is_empty(&self) -> bool {
        self.low == 0 && self.high.is_none()
    }

    pub fn contains(&self, id: FamilyId) -> bool {
        let (word, bit) = locate(id);
        match word {
            0 => self.low & bit != 0,
            n => self
                .high
                .as_ref()
                .and_then(|high| high.get(n - 1))
                .is_some_and(|w| w & bit != 0),
        }
    }

    /// Returns a copy of this set that also contains `id`.
    #[must_use]
    pub fn with(&self, id: FamilyId) -> Self {
        if self.contains(id) {
            return self.clone();
        }
        let (word, bit) = locate(id);
        if word == 0 {
            return Self {
                low: self.low | bit,
                high: self.high.clone(),
            };
        }
        let mut high: Vec<u64> = self.high.as_deref().map(<[u64]>::to_vec).unwrap_or_default();
        if high.len() < word {
            high.resize(word, 0);
        }
        high[word - 1] |= bit;
        Self {
            low: self.low,
            high: Some(high.into()),
        }
    }

    /// Union of both sets.
    #[must_use]
    pub fn merge(&self, other: &BracketIdSet) -> Self {
        let high = match (&self.high, &other.high) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (Some(a), Some(b)) => {
                let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
                let mut words = long.to_vec();
                for (w, s) in words.iter_mut().zip(short.iter()) {
                    *w |= s;
                }
                Some(words.into())
            }
        };
        Self {
            low: self.low | other.low,
            high,
        }
    }

    pub fn intersects(&self, other: &BracketIdSet) -> bool {
        if self.low & other.low != 0 {
            return true;
        }
        match (&self.high, &other.high) {
            (Some(a), Some(b)) => a.iter().zip(b.iter()).any(|(x, y)| x & y != 0),
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = FamilyId> + '_ {
        let high = self.high.as_deref().unwrap_or(&[]);
        std::iter::once(self.low)
            .chain(high.iter().copied())
            .enumerate()
            .flat_map(|(word, bits)| {
                (0..64u32)
                    .filter(move |bit| bits & (1u64 << bit) != 0)
                    .map(move |bit| FamilyId::new(word as u32 * 64 + bit))
            })
    }
}

fn locate(id: FamilyId) -> (usize, u64) {
    let raw = id.get();
    ((raw / 64) as usize, 1u64 << (raw % 64))
}

impl FromIterator<FamilyId> for BracketIdSet {
    fn from_iter<I: IntoIterator<Item = FamilyId>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BracketIdSet::empty(), |set, id| set.with(id))
    }
}

impl fmt::Debug for BracketIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(FamilyId::get)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> BracketIdSet {
        raw.iter().map(|&id| FamilyId::new(id)).collect()
    }

    #[test]
    fn empty_set_contains_nothing() {
        let set = BracketIdSet::empty();
        assert!(set.is_empty());
        assert!(!set.contains(FamilyId::new(0)));
        assert!(!set.intersects(&ids(&[0, 1, 200])));
    }

    #[test]
    fn with_is_persistent() {
        let a = ids(&[1]);
        let b = a.with(FamilyId::new(2));
        assert!(!a.contains(FamilyId::new(2)));
        assert!(b.contains(FamilyId::new(1)));
        assert!(b.contains(FamilyId::new(2)));
    }

    #[test]
    fn large_ids_spill_over() {
        let set = ids(&[3, 70, 300]);
        assert!(set.contains(FamilyId::new(70)));
        assert!(set.contains(FamilyId::new(300)));
        assert!(!set.contains(FamilyId::new(71)));
        assert_eq!(
            set.iter().map(FamilyId::get).collect::<Vec<_>>(),
            vec![3, 70, 300]
        );
    }

    #[test]
    fn merge_and_intersect() {
        let a = ids(&[1, 130]);
        let b = ids(&[2, 131]);
        assert!(!a.intersects(&b));
        let merged = a.merge(&b);
        assert_eq!(merged, ids(&[1, 2, 130, 131]));
        assert!(merged.intersects(&ids(&[131])));
        assert!(merged.intersects(&ids(&[2])));
    }
}
