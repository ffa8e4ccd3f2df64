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

//! Path grammar: `path := "/" | ("/" component)+ "/"`, `component :=
//! [a-z]{1,max_name}`. Every function here is a pure string operation; none
//! of them touch a [`crate::tree::Tree`].

/// The default bound on a single component's length, overridable via
/// [`crate::config::Config::max_name_len`].
pub const DEFAULT_MAX_NAME: usize = 255;

/// Root path constant.
pub const ROOT: &str = "/";

/// `valid(path)`: syntactically well-formed under the grammar above.
pub fn valid(path: &str, max_name: usize) -> bool {
    if path == ROOT {
        return true;
    }
    if !path.starts_with('/') || !path.ends_with('/') || path.len() < 2 {
        return false;
    }
    let inner = &path[1..path.len() - 1];
    inner.split('/').all(|c| is_component(c, max_name))
}

fn is_component(c: &str, max_name: usize) -> bool {
    !c.is_empty() && c.len() <= max_name && c.bytes().all(|b| b.is_ascii_lowercase())
}

/// `is_root(path)`: path equals `/`.
pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Split off the first component of a *trailing-slash, no-leading-slash*
/// fragment (e.g. `"a/b/c/"`). Returns the remainder; an empty remainder
/// means the fragment was exactly one component. Callers descend with this
/// by feeding it [`between`]`(ROOT, path)` style fragments.
pub fn split(fragment: &str) -> (&str, &str) {
    match fragment.find('/') {
        Some(idx) => (&fragment[..idx], &fragment[idx + 1..]),
        None => (fragment, ""),
    }
}

/// `parent_of(path)`: the path to the parent and the last component. The
/// parent path is `/` (the root marker) when `path` is a single component.
///
/// Panics if `path` is the root — callers must check [`is_root`] first, as
/// the root has no parent.
pub fn parent_of(path: &str) -> (String, &str) {
    debug_assert!(!is_root(path));
    let inner = &path[1..path.len() - 1];
    match inner.rfind('/') {
        Some(idx) => (format!("/{}/", &inner[..idx]), &inner[idx + 1..]),
        None => (ROOT.to_owned(), inner),
    }
}

/// `between(ancestor, descendant)`: the relative, no-leading-slash,
/// trailing-slash path from `ancestor` down to `descendant`. Empty when the
/// two are equal. `ancestor` must actually be an ancestor of (or equal to)
/// `descendant` — this is a pure slice operation, not re-validated here.
pub fn between<'a>(ancestor: &str, descendant: &'a str) -> &'a str {
    if ancestor == ROOT {
        &descendant[1..]
    } else {
        &descendant[ancestor.len()..]
    }
}

fn components(path: &str) -> Vec<&str> {
    if is_root(path) {
        Vec::new()
    } else {
        path[1..path.len() - 1].split('/').collect()
    }
}

fn from_components(components: &[&str]) -> String {
    if components.is_empty() {
        ROOT.to_owned()
    } else {
        format!("/{}/", components.join("/"))
    }
}

/// `common_ancestor(p1, p2)`: the deepest path that is an ancestor of both.
pub fn common_ancestor(p1: &str, p2: &str) -> String {
    let c1 = components(p1);
    let c2 = components(p2);
    let shared = c1
        .iter()
        .zip(c2.iter())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| *a)
        .collect::<Vec<_>>();
    from_components(&shared)
}

/// `is_subfolder(a, b)`: true iff `b` lies strictly inside the subtree
/// rooted at `a`.
pub fn is_subfolder(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    if a == ROOT {
        return b != ROOT;
    }
    b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(valid("/", 255));
        assert!(valid("/a/", 255));
        assert!(valid("/a/bcd/", 255));
        assert!(!valid("", 255));
        assert!(!valid("/A/", 255));
        assert!(!valid("/a", 255));
        assert!(!valid("a/", 255));
        assert!(!valid("/a//b/", 255));
        assert!(!valid("/a1/", 255));
        assert!(!valid("/abcdef/", 3));
    }

    #[test]
    fn parent_and_split() {
        assert_eq!(parent_of("/a/"), (ROOT.to_owned(), "a"));
        assert_eq!(parent_of("/a/b/"), ("/a/".to_owned(), "b"));
        assert_eq!(parent_of("/a/b/c/"), ("/a/b/".to_owned(), "c"));
        assert_eq!(split("a/b/c/"), ("a", "b/c/"));
        assert_eq!(split("a/"), ("a", ""));
    }

    #[test]
    fn between_and_ancestor() {
        assert_eq!(between(ROOT, "/a/b/"), "a/b/");
        assert_eq!(between("/a/", "/a/b/c/"), "b/c/");
        assert_eq!(between("/a/b/", "/a/b/"), "");
        assert_eq!(common_ancestor("/a/b/", "/a/c/"), "/a/");
        assert_eq!(common_ancestor("/a/", "/b/"), ROOT);
        assert_eq!(common_ancestor("/a/b/", "/a/b/c/"), "/a/b/");
    }

    #[test]
    fn subfolder() {
        assert!(is_subfolder(ROOT, "/a/"));
        assert!(is_subfolder("/a/", "/a/b/"));
        assert!(!is_subfolder("/a/", "/a/"));
        assert!(!is_subfolder("/ab/", "/a/"));
        assert!(!is_subfolder("/a/", "/ab/"));
    }
}
