/*
 * This file is a part of Arbor.
 *
 * Arbor is a free and open-source, embeddable concurrent directory-tree
 * engine: a rooted labelled tree of named folders, safely mutated and
 * traversed by many threads at once, with no persistence, content, or
 * network surface of its own.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! Shared utilities for the `arbor` workspace
//!
//! This contains modules which are shared by the `arbord` binary and any
//! other front-end built against the `arbor` library.

pub mod util;

/// The crate version, surfaced by `arbord --version` and the banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// A short pointer printed alongside the version banner.
pub const URL: &str = "https://github.com/arbor-rs/arbor";
