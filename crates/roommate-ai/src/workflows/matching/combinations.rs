use std::iter::FusedIterator;

/// Lazily enumerate every `size`-element subset of `pool` in lexicographic index order.
///
/// Each subset appears once and keeps the pool's relative order. Nothing is materialised ahead
/// of the caller, so stopping after N items costs N items of work.
pub fn combinations<T>(pool: &[T], size: usize) -> Combinations<'_, T> {
    let exhausted = size > pool.len();
    Combinations {
        pool,
        indices: if exhausted { Vec::new() } else { (0..size).collect() },
        started: false,
        exhausted,
    }
}

#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl<T> Combinations<'_, T> {
    fn advance(&mut self) -> bool {
        let size = self.indices.len();
        let offset = self.pool.len() - size;

        let Some(position) = (0..size).rev().find(|&i| self.indices[i] < i + offset) else {
            return false;
        };

        self.indices[position] += 1;
        for next in position + 1..size {
            self.indices[next] = self.indices[next - 1] + 1;
        }
        true
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        if self.started {
            if !self.advance() {
                self.exhausted = true;
                return None;
            }
        } else {
            self.started = true;
        }

        let pool = self.pool;
        Some(self.indices.iter().map(|&i| &pool[i]).collect())
    }
}

impl<T> FusedIterator for Combinations<'_, T> {}
