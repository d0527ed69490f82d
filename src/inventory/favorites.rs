use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::errors::StoreError;
use crate::inventory::Container;
use crate::store::{KeyValueStore, get_typed, set_typed};

pub const LIKED_KEY: &str = "LikedContainers";

/// Set of favorited container ids.
///
/// A saved set that does not decode loads as empty and is left on disk;
/// `toggle` refuses to write until `clear` replaces it.
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    liked: BTreeSet<u32>,
    undecodable: bool,
}

impl Favorites {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let (liked, undecodable) = match get_typed::<Vec<u32>>(store.as_ref(), LIKED_KEY) {
            Ok(liked) => (liked.unwrap_or_default(), false),
            Err(StoreError::Decode { source, .. }) => {
                warn!(error = %source, "Saved favorites could not be decoded, leaving them untouched");
                (Vec::new(), true)
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            store,
            liked: liked.into_iter().collect(),
            undecodable,
        })
    }

    /// Flip the favorite flag for `id`. Returns the new state.
    pub fn toggle(&mut self, id: u32) -> Result<bool, StoreError> {
        if self.undecodable {
            return Err(StoreError::Undecodable {
                key: LIKED_KEY.to_string(),
            });
        }
        let liked = if self.liked.remove(&id) {
            false
        } else {
            self.liked.insert(id);
            true
        };
        self.save()?;
        Ok(liked)
    }

    pub fn is_liked(&self, id: u32) -> bool {
        self.liked.contains(&id)
    }

    /// The favorited subset of `containers`, in their original order.
    pub fn liked_from<'a>(&self, containers: &'a [Container]) -> Vec<&'a Container> {
        containers
            .iter()
            .filter(|c| self.liked.contains(&c.id))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.liked.len()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.liked.clear();
        self.save()?;
        self.undecodable = false;
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let ids: Vec<u32> = self.liked.iter().copied().collect();
        set_typed(self.store.as_ref(), LIKED_KEY, &ids)
    }
}
