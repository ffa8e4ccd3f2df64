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

use core::fmt;

/// A tree operation's result.
pub type TreeResult<T> = Result<T, Kind>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// The complete error taxonomy for every tree operation
pub enum Kind {
    /// path syntactically ill-formed, or `move`'s target lies inside `source`
    Invalid,
    /// a path component along the traversal is missing, or `move`'s source is missing
    NotFound,
    /// `create` on an existing folder, `move` onto an existing target, or `move` onto root
    Exists,
    /// `remove` on a non-empty folder
    NotEmpty,
    /// `remove` on the root, or `move` with `source` equal to root
    Busy,
    /// `move`'s target lies strictly inside `source`
    Loop,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Invalid => "invalid path",
            Self::NotFound => "no such folder",
            Self::Exists => "folder already exists",
            Self::NotEmpty => "folder is not empty",
            Self::Busy => "operation not permitted on the root",
            Self::Loop => "target lies inside source",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Kind {}
