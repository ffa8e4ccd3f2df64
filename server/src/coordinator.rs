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

//! The per-node reader/writer/cleaner coordinator.
//!
//! Three modes, each weaker or stronger than the others in a specific way:
//! `read` (many can coexist), `write` (exclusive, mutates the node's
//! children), and `clean` (asserts the subtree below is quiescent — nobody
//! active, nobody queued — so the node can be detached and destroyed). A
//! single [`Mutex`] serialises the bookkeeping; three [`Condvar`]s give
//! targeted wake-ups instead of a thundering herd on every release.
//!
//! The `change` field is the explicit hand-off token that breaks both
//! starvation cases a naive readers-writers lock falls into: a steady
//! stream of writers starving readers, and vice versa. See the type-level
//! docs on [`State`] for the encoding.

use crate::util::compiler::unlikely;
use parking_lot::{Condvar, Mutex};

/// Bookkeeping behind the coordinator's single mutex.
struct State {
    /// active readers
    rcount: u32,
    /// active writers (0 or 1)
    wcount: u32,
    /// readers parked in [`Coordinator::read_acquire`]
    rwait: u32,
    /// writers parked in [`Coordinator::write_acquire`]
    wwait: u32,
    /// the hand-off token: `0` no pending hand-off, `-1` a writer has
    /// priority, `k > 0` a batch of `k` readers has priority
    change: i32,
}

impl State {
    const fn new() -> Self {
        Self {
            rcount: 0,
            wcount: 0,
            rwait: 0,
            wwait: 0,
            change: 0,
        }
    }
}

pub struct Coordinator {
    state: Mutex<State>,
    readers: Condvar,
    writers: Condvar,
    cleaners: Condvar,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::new()),
            readers: Condvar::new(),
            writers: Condvar::new(),
            cleaners: Condvar::new(),
        }
    }

    /// Acquire read access, blocking until admitted.
    pub fn read(&self) -> ReadGuard<'_> {
        self.read_acquire();
        ReadGuard { c: self }
    }

    /// Acquire exclusive write access, blocking until admitted.
    pub fn write(&self) -> WriteGuard<'_> {
        self.write_acquire();
        WriteGuard { c: self }
    }

    /// Block until nobody holds or is waiting for this node: no active
    /// readers/writers, no queued readers/writers. There is no paired
    /// release — the caller is expected to detach/destroy the node right
    /// away, under an ancestor's write lock that already prevents new
    /// traffic from arriving.
    pub fn clean_acquire(&self) {
        let mut s = self.state.lock();
        while unlikely(s.rcount > 0 || s.wcount > 0 || s.rwait > 0 || s.wwait > 0) {
            log::trace!("clean_acquire: waiting for subtree to quiesce");
            self.cleaners.wait(&mut s);
        }
    }

    fn read_acquire(&self) {
        let mut s = self.state.lock();
        if unlikely(s.change <= 0 && s.wcount + s.wwait > 0) {
            log::trace!("read_acquire: blocked behind a writer, parking");
        }
        while unlikely(s.change <= 0 && s.wcount + s.wwait > 0) {
            s.rwait += 1;
            self.readers.wait(&mut s);
            s.rwait -= 1;
        }
        if s.change > 0 {
            s.change -= 1;
        }
        s.rcount += 1;
        if s.change > 0 {
            // drain the rest of the handed-off batch one at a time
            self.readers.notify_one();
        }
    }

    fn read_release(&self) {
        let mut s = self.state.lock();
        s.rcount -= 1;
        if s.rcount == 0 {
            if s.wwait > 0 {
                s.change = -1;
                self.writers.notify_one();
            } else {
                self.cleaners.notify_all();
            }
        }
    }

    fn write_acquire(&self) {
        let mut s = self.state.lock();
        if unlikely(s.wcount + s.rcount > 0) {
            log::debug!(
                "write_acquire: contended (rcount={}, wcount={})",
                s.rcount,
                s.wcount
            );
        }
        while unlikely(s.change != -1 && s.wcount + s.rcount > 0) {
            s.wwait += 1;
            self.writers.wait(&mut s);
            s.wwait -= 1;
        }
        s.change = 0;
        s.wcount += 1;
    }

    fn write_release(&self) {
        let mut s = self.state.lock();
        s.wcount -= 1;
        if s.rwait > 0 {
            log::trace!("write_release: handing off to a batch of {} readers", s.rwait);
            s.change = s.rwait as i32;
            self.readers.notify_one();
        } else if s.wwait > 0 {
            s.change = -1;
            self.writers.notify_one();
        } else {
            self.cleaners.notify_all();
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// A held read lock. Released on drop.
pub struct ReadGuard<'a> {
    c: &'a Coordinator,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.c.read_release();
    }
}

/// A held write lock. Released on drop.
pub struct WriteGuard<'a> {
    c: &'a Coordinator,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.c.write_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn readers_coexist() {
        let c = Coordinator::new();
        let g1 = c.read();
        let g2 = c.read();
        drop(g1);
        drop(g2);
    }

    #[test]
    fn writer_excludes_everyone() {
        let c = Arc::new(Coordinator::new());
        let _w = c.write();
        let c2 = c.clone();
        let handle = thread::spawn(move || {
            let _r = c2.read();
        });
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        drop(_w);
        handle.join().unwrap();
    }

    #[test]
    fn writer_then_reader_batch_then_writer() {
        // a writer that releases into a batch of waiting readers must hand
        // off change = rwait, and the batch must drain before any new
        // writer is admitted.
        let c = Arc::new(Coordinator::new());
        let w = c.write();
        let barrier = Arc::new(std::sync::Barrier::new(4));
        let mut readers = Vec::new();
        for _ in 0..3 {
            let c2 = c.clone();
            let b2 = barrier.clone();
            readers.push(thread::spawn(move || {
                b2.wait();
                let _g = c2.read();
                thread::sleep(Duration::from_millis(20));
            }));
        }
        barrier.wait();
        thread::sleep(Duration::from_millis(20));
        drop(w);
        for r in readers {
            r.join().unwrap();
        }
    }

    #[test]
    fn clean_waits_for_drain() {
        let c = Arc::new(Coordinator::new());
        let g = c.read();
        let c2 = c.clone();
        let handle = thread::spawn(move || {
            c2.clean_acquire();
        });
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        drop(g);
        handle.join().unwrap();
    }
}
