//! Tag resolution by object database scan

use git2::Oid;
use tracing::{debug, warn};

/// A tag resolved to the commit it points at
///
/// Only object ids are kept so no libgit2 handle outlives the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    /// Tag name as stored in the tag object or reference
    pub name: String,
    /// Id of the tag object, or of the commit for lightweight tags
    pub object_id: Oid,
    /// Id of the commit the tag points at
    pub target_id: Oid,
}

impl ResolvedTag {
    /// The reference HEAD is moved to after checkout
    #[must_use]
    #[inline]
    pub fn reference(&self) -> String {
        tag_reference(&self.name)
    }
}

/// Full reference name for a tag
#[must_use]
#[inline]
pub fn tag_reference(name: &str) -> String {
    format!("refs/tags/{name}")
}

/// Accumulates the outcome of enumerating the object database
///
/// Each enumerated object is fed to [`TagScan::observe`] as either a tag
/// candidate, `None` for objects that are not tags, or the error raised while
/// reading it. The first error stops the scan. A match seen before that error
/// still wins in [`TagScan::finish`].
///
/// When several tag objects carry the name, the one `refs/tags/<name>` points
/// at (see [`TagScan::prefer`]) is kept; without it the last one scanned wins.
#[derive(Debug)]
pub struct TagScan<'query, E> {
    query: &'query str,
    preferred: Option<Oid>,
    found: Option<ResolvedTag>,
    error: Option<E>,
    scanned: usize,
    tags_seen: usize,
}

impl<'query, E: core::fmt::Display> TagScan<'query, E> {
    #[must_use]
    #[inline]
    pub const fn new(query: &'query str) -> Self {
        Self {
            query,
            preferred: None,
            found: None,
            error: None,
            scanned: 0,
            tags_seen: 0,
        }
    }

    /// Break ties between same-named tag objects in favour of `object_id`
    #[must_use]
    #[inline]
    pub fn prefer(mut self, object_id: Option<Oid>) -> Self {
        self.preferred = object_id;
        self
    }

    /// Record one enumerated object; returns `false` once the scan must stop
    #[inline]
    pub fn observe(&mut self, object: Result<Option<ResolvedTag>, E>) -> bool {
        self.scanned += 1;
        match object {
            Ok(None) => true,
            Ok(Some(tag)) => {
                self.tags_seen += 1;
                if tag.name == self.query {
                    self.record_match(tag);
                }
                true
            }
            Err(err) => {
                debug!("Object scan stopped after {} objects: {err}", self.scanned);
                self.fail(err);
                false
            }
        }
    }

    fn record_match(&mut self, tag: ResolvedTag) {
        let Some(previous) = self.found.as_ref() else {
            self.found = Some(tag);
            return;
        };

        let keep_previous = self.preferred == Some(previous.object_id);
        let (kept, dropped) = if keep_previous {
            (previous.object_id, tag.object_id)
        } else {
            (tag.object_id, previous.object_id)
        };
        warn!(
            "Several tag objects are named '{}'; using {kept} instead of {dropped}",
            self.query
        );
        if !keep_previous {
            self.found = Some(tag);
        }
    }

    /// Record an error raised by the enumeration itself
    #[inline]
    pub fn fail(&mut self, err: E) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Finish the scan
    ///
    /// # Errors
    ///
    /// Returns the recorded error when no matching tag was found before it
    #[inline]
    pub fn finish(self) -> Result<Option<ResolvedTag>, E> {
        debug!(
            "Scanned {} objects, {} tags, looking for '{}'",
            self.scanned, self.tags_seen, self.query
        );
        match (self.found, self.error) {
            (Some(tag), Some(err)) => {
                warn!("Using tag '{}' found before object scan error: {err}", tag.name);
                Ok(Some(tag))
            }
            (Some(tag), None) => Ok(Some(tag)),
            (None, Some(err)) => Err(err),
            (None, None) => Ok(None),
        }
    }
}
