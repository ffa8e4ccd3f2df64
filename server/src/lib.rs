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

//! # Arbor
//!
//! A concurrent, in-memory, rooted directory tree. There is no file content,
//! no access control and nothing is ever written to disk — see the crate's
//! `arbord` binary for a minimal shell built on top of this engine.
//!
//! The tree is a plain [`Tree`], cheaply constructed and safe to share
//! across threads behind an [`std::sync::Arc`]. Every operation takes `&self`;
//! internal synchronization is per-folder, not a single global lock, so
//! unrelated folders never contend with each other.

mod childmap;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod path;
pub mod tree;
mod util;

pub use error::{Kind, TreeResult};
pub use tree::Tree;
