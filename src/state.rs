use bitflags::bitflags;

bitflags! {
    /// Per-entity state bits driving visibility and render-cache reuse.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntityStateFlags: u8 {
        /// Entity is not rendered and not hit-tested
        const HIDDEN   = 0b001;
        /// The entity's cached frame is up to date
        const CACHED   = 0b010;
        /// Entity changed since it was last rendered
        const MODIFIED = 0b100;
    }
}

/// Something whose rendered output can go stale.
pub trait Invalidatable {
    /// Drop any cached rendering and request a redraw.
    fn invalidate(&mut self);

    /// Request a redraw. `bubbling` marks a change reported by a descendant,
    /// which also makes the cached rendering stale.
    fn modified(&mut self, bubbling: bool);
}

pub fn invalidate(flags: &mut EntityStateFlags) {
    flags.remove(EntityStateFlags::CACHED);
    flags.insert(EntityStateFlags::MODIFIED);
}

pub fn mark_modified(flags: &mut EntityStateFlags, bubbling: bool) {
    if bubbling {
        flags.remove(EntityStateFlags::CACHED);
    }
    flags.insert(EntityStateFlags::MODIFIED);
}

pub fn mark_cached(flags: &mut EntityStateFlags) {
    flags.insert(EntityStateFlags::CACHED);
}

/// Clear the redraw request after a render.
pub fn mark_rendered(flags: &mut EntityStateFlags) {
    flags.remove(EntityStateFlags::MODIFIED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_drops_cache() {
        let mut flags = EntityStateFlags::CACHED;
        invalidate(&mut flags);
        assert!(!flags.contains(EntityStateFlags::CACHED));
        assert!(flags.contains(EntityStateFlags::MODIFIED));
    }

    #[test]
    fn test_modified_keeps_cache_unless_bubbling() {
        let mut flags = EntityStateFlags::CACHED;
        mark_modified(&mut flags, false);
        assert!(flags.contains(EntityStateFlags::CACHED | EntityStateFlags::MODIFIED));

        mark_modified(&mut flags, true);
        assert!(!flags.contains(EntityStateFlags::CACHED));
    }

    #[test]
    fn test_mark_rendered() {
        let mut flags = EntityStateFlags::MODIFIED | EntityStateFlags::HIDDEN;
        mark_rendered(&mut flags);
        assert_eq!(flags, EntityStateFlags::HIDDEN);
    }
}
