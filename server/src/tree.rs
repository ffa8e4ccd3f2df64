/*
 * This file is a part of Arbor.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The tree itself: a [`Node`] per folder, each owning a
//! [`crate::coordinator::Coordinator`] and a [`crate::childmap::ChildMap`],
//! and the four operations that walk it.
//!
//! Every traversal is hand-over-hand: the lock on a child is taken before
//! the lock on its parent is released, so a reader or writer is never
//! looking at a node the tree could be concurrently tearing down. That
//! invariant is also what makes the `unsafe` in [`Node::children`] and
//! [`Node::children_mut`] sound without a runtime borrow check — a node's
//! children are never freed while the node itself isn't write-held, so a
//! reference handed back from under a guard stays valid for exactly as long
//! as the guard the caller is already holding.
//!
//! [`Tree::move_to`] is the interesting one. Rather than lock the whole
//! tree, it locks only the lowest common ancestor (LCA) of the source and
//! target paths, plus the read path down to each of their parents. Holding
//! the LCA for write blocks every other traversal from entering the
//! subtree, which is what lets the two descents below it run with plain
//! read locks instead of a second write.

use crate::childmap::ChildMap;
use crate::coordinator::{Coordinator, ReadGuard, WriteGuard};
use crate::error::{Kind, TreeResult};
use crate::path;
use std::cell::UnsafeCell;

/// A single folder. Owns its own synchronization; has no notion of its own
/// path or parent, so relinking one under [`Tree::move_to`] is a pointer
/// move, not a rename of anything stored inside it.
pub struct Node {
    coordinator: Coordinator,
    children: UnsafeCell<ChildMap>,
}

// SAFETY: all access to `children` is mediated by `coordinator`: reads
// require at least a read lock, mutation requires a write lock, and the two
// are mutually exclusive. `UnsafeCell` is otherwise unconditionally `!Sync`.
unsafe impl Sync for Node {}

impl Node {
    pub fn new() -> Self {
        Self {
            coordinator: Coordinator::new(),
            children: UnsafeCell::new(ChildMap::new()),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// # Safety
    /// The caller must hold at least a read lock on this node.
    unsafe fn children(&self) -> &ChildMap {
        &*self.children.get()
    }

    /// # Safety
    /// The caller must hold a write lock on this node.
    #[allow(clippy::mut_from_ref)]
    unsafe fn children_mut(&self) -> &mut ChildMap {
        &mut *self.children.get()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// The tree. The root always exists and is never removable, so unlike every
/// other node it isn't optional and isn't reached through a `ChildMap`.
pub struct Tree {
    root: Node,
    max_name: usize,
}

impl Tree {
    pub fn new() -> Self {
        Self::with_max_name(path::DEFAULT_MAX_NAME)
    }

    pub fn with_max_name(max_name: usize) -> Self {
        Self {
            root: Node::new(),
            max_name,
        }
    }

    /// List the immediate children of `path`, sorted, comma-separated.
    pub fn list(&self, path: &str) -> TreeResult<String> {
        if !path::valid(path, self.max_name) {
            return Err(Kind::Invalid);
        }
        let (node, _guard) = self.read_to(path)?;
        Ok(unsafe { node.children() }.render())
    }

    /// Create a new, empty folder at `path`. The parent must already exist;
    /// `path` itself must not.
    pub fn create(&self, path: &str) -> TreeResult<()> {
        if !path::valid(path, self.max_name) {
            return Err(Kind::Invalid);
        }
        if path::is_root(path) {
            return Err(Kind::Exists);
        }
        let (parent_path, name) = path::parent_of(path);
        let (parent, _guard) = self.write_to(&parent_path)?;
        let children = unsafe { parent.children_mut() };
        if children.get(name).is_some() {
            return Err(Kind::Exists);
        }
        children
            .insert(name.to_owned(), Box::new(Node::new()))
            .expect("presence already checked under the parent's write lock");
        log::info!("create: {path}");
        Ok(())
    }

    /// Remove the (empty) folder at `path`.
    pub fn remove(&self, path: &str) -> TreeResult<()> {
        if !path::valid(path, self.max_name) {
            return Err(Kind::Invalid);
        }
        if path::is_root(path) {
            return Err(Kind::Busy);
        }
        let (parent_path, name) = path::parent_of(path);
        let (parent, _guard) = self.write_to(&parent_path)?;
        let children = unsafe { parent.children_mut() };
        let child = children.get(name).ok_or(Kind::NotFound)?;
        let child_count = unsafe { child.children() }.len();
        if child_count > 0 {
            log::debug!("remove: {path} still has {child_count} entries");
            return Err(Kind::NotEmpty);
        }
        // Nobody can look `child` up afresh from here on (its entry is
        // about to go and `parent` stays write-held until we return), so
        // this only has to wait out whoever already holds a reference from
        // before we got here.
        child.coordinator().clean_acquire();
        children.remove(name);
        log::info!("remove: {path}");
        Ok(())
    }

    /// Relocate the folder at `source` to `target`. `target`'s parent must
    /// exist and `target` itself must not; `source` must exist and must not
    /// be an ancestor of `target`.
    pub fn move_to(&self, source: &str, target: &str) -> TreeResult<()> {
        if !path::valid(source, self.max_name) || !path::valid(target, self.max_name) {
            return Err(Kind::Invalid);
        }
        if path::is_root(source) {
            return Err(Kind::Busy);
        }
        if path::is_root(target) {
            return Err(Kind::Exists);
        }
        if source == target {
            // A no-op, not a loop: moving a folder onto itself leaves the
            // tree unchanged.
            return Ok(());
        }
        if path::is_subfolder(source, target) {
            return Err(Kind::Loop);
        }

        let lca_path = path::common_ancestor(source, target);
        log::debug!("move: lowest common ancestor of {source} and {target} is {lca_path}");
        let (lca, _lca_guard) = self.write_to(&lca_path)?;

        let (target_parent_path, target_name) = path::parent_of(target);
        let (source_parent_path, source_name) = path::parent_of(source);

        // Whether either parent happens to be the LCA is decided
        // independently for each side: the two can't be conflated, since
        // one side landing on the LCA says nothing about the other.
        let target_parent_is_lca = target_parent_path == lca_path;
        let source_parent_is_lca = source_parent_path == lca_path;

        let (target_parent, _target_guard): (&Node, Option<WriteGuard>) =
            if target_parent_is_lca {
                (lca, None)
            } else {
                let rel = path::between(&lca_path, &target_parent_path);
                let (n, g) = self.descend_write_rel(lca, None, rel)?;
                (n, Some(g))
            };

        if unsafe { target_parent.children() }.get(target_name).is_some() {
            return Err(Kind::Exists);
        }

        let (source_parent, _source_guard): (&Node, Option<WriteGuard>) =
            if source_parent_is_lca {
                (lca, None)
            } else {
                let rel = path::between(&lca_path, &source_parent_path);
                let (n, g) = self.descend_write_rel(lca, None, rel)?;
                (n, Some(g))
            };

        let moved = unsafe { source_parent.children_mut() }
            .remove(source_name)
            .ok_or(Kind::NotFound)?;

        // SAFETY: `moved` is unreachable from any fresh traversal the
        // instant it leaves `source_parent`'s map, and `source_parent`
        // stays write-held until we return — so once each node below has
        // been individually quiesced, nothing in the subtree can still be
        // touched by another thread, even without a guard object on hand
        // for the walk itself.
        quiesce_subtree(&moved);

        unsafe { target_parent.children_mut() }
            .insert(target_name.to_owned(), moved)
            .expect("presence already checked under the target parent's write lock");

        log::info!("move: {source} -> {target}");
        Ok(())
    }

    /// Hand-over-hand read descent to the node at `path`.
    fn read_to<'t>(&'t self, path: &str) -> TreeResult<(&'t Node, ReadGuard<'t>)> {
        let mut node: &'t Node = &self.root;
        let mut guard = node.coordinator().read();
        if path::is_root(path) {
            return Ok((node, guard));
        }
        let mut rest = path::between(path::ROOT, path);
        loop {
            let (comp, remainder) = path::split(rest);
            let child: &'t Node = unsafe { node.children() }.get(comp).ok_or(Kind::NotFound)?;
            let child_guard = child.coordinator().read();
            drop(guard);
            node = child;
            guard = child_guard;
            if remainder.is_empty() {
                return Ok((node, guard));
            }
            rest = remainder;
        }
    }

    /// Hand-over-hand read descent to `path`'s parent, finishing with a
    /// write lock on `path` itself.
    fn write_to<'t>(&'t self, path: &str) -> TreeResult<(&'t Node, WriteGuard<'t>)> {
        if path::is_root(path) {
            let guard = self.root.coordinator().write();
            return Ok((&self.root, guard));
        }
        // `descend_write_rel` requires `from` to already be locked at least
        // for read; unlike the `move_to` call sites below (which descend
        // from an LCA the caller is already write-holding), nothing upstream
        // of here has touched root yet, so that lock has to be taken right
        // here.
        let root_guard = self.root.coordinator().read();
        self.descend_write_rel(&self.root, Some(root_guard), path::between(path::ROOT, path))
    }

    /// Hand-over-hand read descent from `from` down the relative fragment
    /// `rel`, finishing with a write lock on the node `rel` names.
    ///
    /// `from` must already be locked by the caller — either a read lock
    /// passed in as `from_guard` (which this function then owns and
    /// releases hand-over-hand, same as every guard acquired during the
    /// descent), or a write lock the caller holds and keeps for the
    /// duration of its own call (in which case `from_guard` is `None`: a
    /// write lock is strictly stronger than what reading `from`'s children
    /// requires, so there is nothing further for this function to manage).
    fn descend_write_rel<'t>(
        &'t self,
        from: &'t Node,
        from_guard: Option<ReadGuard<'t>>,
        rel: &str,
    ) -> TreeResult<(&'t Node, WriteGuard<'t>)> {
        debug_assert!(!rel.is_empty());
        let mut node = from;
        let mut rguard = from_guard;
        let mut rest = rel;
        loop {
            let (comp, remainder) = path::split(rest);
            let child: &'t Node = unsafe { node.children() }.get(comp).ok_or(Kind::NotFound)?;
            if remainder.is_empty() {
                let wguard = child.coordinator().write();
                drop(rguard);
                return Ok((child, wguard));
            }
            let child_guard = child.coordinator().read();
            drop(rguard);
            rguard = Some(child_guard);
            node = child;
            rest = remainder;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn quiesce_subtree(node: &Node) {
    node.coordinator().clean_acquire();
    for (_, child) in unsafe { node.children() }.iter() {
        quiesce_subtree(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn create_list_remove() {
        let t = Tree::new();
        assert_eq!(t.list("/").unwrap(), "");
        t.create("/a/").unwrap();
        t.create("/b/").unwrap();
        assert_eq!(t.list("/").unwrap(), "a,b");
        t.create("/a/x/").unwrap();
        assert_eq!(t.list("/a/").unwrap(), "x");
        t.remove("/a/x/").unwrap();
        assert_eq!(t.list("/a/").unwrap(), "");
        t.remove("/a/").unwrap();
        assert_eq!(t.list("/").unwrap(), "b");
    }

    #[test]
    fn create_rejects_duplicate_and_missing_parent() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        assert_eq!(t.create("/a/"), Err(Kind::Exists));
        assert_eq!(t.create("/missing/x/"), Err(Kind::NotFound));
    }

    #[test]
    fn remove_rejects_root_and_nonempty() {
        let t = Tree::new();
        assert_eq!(t.remove("/"), Err(Kind::Busy));
        t.create("/a/").unwrap();
        t.create("/a/b/").unwrap();
        assert_eq!(t.remove("/a/"), Err(Kind::NotEmpty));
        assert_eq!(t.remove("/nope/"), Err(Kind::NotFound));
    }

    #[test]
    fn move_same_path_is_a_noop() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        assert_eq!(t.move_to("/a/", "/a/"), Ok(()));
        assert_eq!(t.list("/").unwrap(), "a");
    }

    #[test]
    fn move_rejects_root_source_and_target() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        assert_eq!(t.move_to("/", "/x/"), Err(Kind::Busy));
        assert_eq!(t.move_to("/a/", "/"), Err(Kind::Exists));
    }

    #[test]
    fn move_rejects_loop_into_own_subtree() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        t.create("/a/b/").unwrap();
        assert_eq!(t.move_to("/a/", "/a/b/c/"), Err(Kind::Loop));
    }

    #[test]
    fn move_relocates_subtree_across_branches() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        t.create("/a/b/").unwrap();
        t.create("/a/b/c/").unwrap();
        t.create("/d/").unwrap();
        t.move_to("/a/b/", "/d/b/").unwrap();
        assert_eq!(t.list("/a/").unwrap(), "");
        assert_eq!(t.list("/d/").unwrap(), "b");
        assert_eq!(t.list("/d/b/").unwrap(), "c");
    }

    #[test]
    fn move_fails_on_existing_target_and_missing_source() {
        let t = Tree::new();
        t.create("/a/").unwrap();
        t.create("/b/").unwrap();
        assert_eq!(t.move_to("/a/", "/b/"), Err(Kind::Exists));
        assert_eq!(t.move_to("/missing/", "/c/"), Err(Kind::NotFound));
    }

    #[test]
    fn concurrent_create_and_list_under_same_parent() {
        let t = Arc::new(Tree::new());
        t.create("/a/").unwrap();
        let names = "abcdefgh";
        let mut handles = Vec::new();
        for c in names.chars() {
            let t = t.clone();
            handles.push(thread::spawn(move || {
                t.create(&format!("/a/n{c}/")).unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let listing = t.list("/a/").unwrap();
        assert_eq!(listing.split(',').count(), 8);
    }
}
