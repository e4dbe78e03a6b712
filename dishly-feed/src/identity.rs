//! Item identity and identity-based deduplication.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Identity of a list item.
///
/// Integer and string ids never compare equal: `Int(1)` and `Str("1")` are
/// two different items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ItemKey {
    /// Numeric id (database primary keys).
    Int(i64),
    /// Textual id (slugs, UUIDs).
    Str(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemKey {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for ItemKey {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<u32> for ItemKey {
    fn from(id: u32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<String> for ItemKey {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl From<&str> for ItemKey {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

/// Types that carry their own identity.
///
/// Returning `None` opts an item out of deduplication.
pub trait Keyed {
    /// The identity of this item, if it has one.
    fn item_key(&self) -> Option<ItemKey>;
}

/// Shared identity-extraction function.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> Option<ItemKey> + Send + Sync>;

/// Identity extraction for [`Keyed`] types.
pub fn keyed<T: Keyed + 'static>() -> KeyFn<T> {
    Arc::new(T::item_key)
}

/// Identity extraction that never deduplicates.
pub fn unkeyed<T: 'static>() -> KeyFn<T> {
    Arc::new(|_: &T| None)
}

/// Append `batch` to `existing`, dropping items whose id was already seen.
///
/// The pass runs left to right over the existing items and then the new batch,
/// so the earliest occurrence of an id always wins: a repeated id in the batch
/// is dropped and never replaces the item already in the list. Items without
/// an id are always kept. Returns the number of batch items that were kept.
///
/// ```
/// use dishly_feed::{ItemKey, append_deduped};
///
/// let key_of = |n: &i64| Some(ItemKey::Int(*n));
/// let mut list = vec![1, 2];
/// let added = append_deduped(&mut list, vec![2, 3], &key_of);
/// assert_eq!(list, vec![1, 2, 3]);
/// assert_eq!(added, 1);
/// ```
pub fn append_deduped<T, F>(existing: &mut Vec<T>, batch: Vec<T>, key_of: &F) -> usize
where
    F: Fn(&T) -> Option<ItemKey> + ?Sized,
{
    let mut seen: HashSet<ItemKey> = HashSet::with_capacity(existing.len() + batch.len());
    existing.retain(|item| key_of(item).is_none_or(|key| seen.insert(key)));

    let before = existing.len();
    existing.extend(
        batch
            .into_iter()
            .filter(|item| key_of(item).is_none_or(|key| seen.insert(key))),
    );
    existing.len() - before
}
