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

//! The name→child mapping. This container runs no locking of its own: every
//! caller is expected to already hold the owning node's [`crate::coordinator::Coordinator`]
//! in the mode the operation requires (read for `get`/`iter`/`render`, write
//! for `insert`/`remove`).

use crate::tree::Node;
use std::collections::HashMap;

#[derive(Default)]
pub struct ChildMap {
    inner: HashMap<String, Box<Node>>,
}

impl ChildMap {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.inner.get(name).map(|b| b.as_ref())
    }

    /// Insert a freshly allocated child. Fails if `name` is already present.
    pub fn insert(&mut self, name: String, child: Box<Node>) -> Result<(), ()> {
        if self.inner.contains_key(&name) {
            return Err(());
        }
        self.inner.insert(name, child);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<Node>> {
        self.inner.remove(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Snapshot-consistent only under the caller's held coordinator lock.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Render the child-name listing in sorted order, comma-separated.
    pub fn render(&self) -> String {
        let mut names: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut m = ChildMap::new();
        assert!(m.insert("a".into(), Box::new(Node::new())).is_ok());
        assert!(m.insert("a".into(), Box::new(Node::new())).is_err());
        assert!(m.get("a").is_some());
        assert!(m.get("b").is_none());
        assert!(m.remove("a").is_some());
        assert!(m.get("a").is_none());
    }

    #[test]
    fn render_is_sorted() {
        let mut m = ChildMap::new();
        m.insert("zeta".into(), Box::new(Node::new())).unwrap();
        m.insert("alpha".into(), Box::new(Node::new())).unwrap();
        m.insert("mid".into(), Box::new(Node::new())).unwrap();
        assert_eq!(m.render(), "alpha,mid,zeta");
    }
}
