//! Table compression: full row-major vectors and base/check/next comb
//! vectors.
//!
//! The comb encoding overlays sparse rows in one long `next` vector:
//! `base[row]` offsets the row, `check[slot]` tags the owning row, and a
//! lookup `(row, col)` is valid iff `check[base[row] + col] == row`. Rows
//! are placed greedily, densest first, at the lowest offset where their
//! filled columns hit no occupied slot.

/// Sentinel for "no entry" in full vectors and for unowned comb slots.
pub const NO_ENTRY: u32 = u32::MAX;

/// A compressed two-dimensional table over `u32` values.
#[derive(Debug, Clone)]
pub enum Table {
    Full(FullVec),
    Comb(CombVec),
}

#[derive(Debug, Clone)]
pub struct FullVec {
    cols: usize,
    data: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct CombVec {
    base: Vec<u32>,
    check: Vec<u32>,
    next: Vec<u32>,
}

impl Table {
    /// Build the table from a generator over `(row, col)`, picking the comb
    /// encoding when it saves at least ~60%: `2 * full_len > 5 * comb_len`.
    pub fn build(rows: usize, cols: usize, get: impl Fn(usize, usize) -> Option<u32>) -> Table {
        let mut entries: Vec<Option<u32>> = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                entries.push(get(row, col));
            }
        }

        let comb = CombVec::place(rows, cols, &entries);
        let full_len = rows * cols;
        if 2 * full_len > 5 * comb.next.len() {
            Table::Comb(comb)
        } else {
            Table::Full(FullVec {
                cols,
                data: entries.iter().map(|e| e.unwrap_or(NO_ENTRY)).collect(),
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        match self {
            Table::Full(full) => {
                let value = full.data[row * full.cols + col];
                (value != NO_ENTRY).then_some(value)
            }
            Table::Comb(comb) => comb.get(row, col),
        }
    }

    /// Total vector length, for stats output.
    pub fn len(&self) -> usize {
        match self {
            Table::Full(full) => full.data.len(),
            Table::Comb(comb) => comb.base.len() + comb.check.len() + comb.next.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_comb(&self) -> bool {
        matches!(self, Table::Comb(_))
    }
}

impl CombVec {
    fn place(rows: usize, cols: usize, entries: &[Option<u32>]) -> CombVec {
        let filled_cols = |row: usize| {
            (0..cols).filter(move |col| entries[row * cols + col].is_some())
        };

        // Densest rows first; ties keep row order.
        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by_key(|&row| (std::cmp::Reverse(filled_cols(row).count()), row));

        let mut base = vec![0u32; rows];
        let mut check: Vec<u32> = Vec::new();
        let mut next: Vec<u32> = Vec::new();

        for &row in &order {
            let filled: Vec<usize> = filled_cols(row).collect();
            let mut offset = 0usize;
            loop {
                let collides = filled
                    .iter()
                    .any(|&col| check.get(offset + col).is_some_and(|&owner| owner != NO_ENTRY));
                if !collides {
                    break;
                }
                offset += 1;
            }

            let end = offset + cols.max(filled.last().map_or(0, |c| c + 1));
            if end > next.len() {
                next.resize(end, NO_ENTRY);
                check.resize(end, NO_ENTRY);
            }
            base[row] = offset as u32;
            for &col in &filled {
                next[offset + col] = entries[row * cols + col].unwrap();
                check[offset + col] = row as u32;
            }
        }

        CombVec { base, check, next }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        let slot = self.base[row] as usize + col;
        match self.check.get(slot) {
            Some(&owner) if owner == row as u32 => Some(self.next[slot]),
            _ => None,
        }
    }

    /// The comb-vector consistency property: every valid entry's slot is
    /// tagged with its owning row.
    #[cfg(test)]
    fn check_owns(&self, row: usize, col: usize) -> bool {
        let slot = self.base[row] as usize + col;
        self.check.get(slot).is_some_and(|&owner| owner == row as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sparse diagonal: each row has one entry, so rows overlay almost
    /// entirely and the comb encoding wins.
    fn diagonal(rows: usize, cols: usize) -> Table {
        Table::build(rows, cols, |row, col| {
            (col == row % cols).then_some((row * 10) as u32)
        })
    }

    #[test]
    fn dense_tables_stay_full() {
        let table = Table::build(4, 4, |row, col| Some((row * 4 + col) as u32));
        assert!(!table.is_comb());
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(table.get(row, col), Some((row * 4 + col) as u32));
            }
        }
    }

    #[test]
    fn sparse_tables_compress() {
        let table = diagonal(32, 16);
        assert!(table.is_comb(), "one entry per 16-column row must compress");
        for row in 0..32 {
            for col in 0..16 {
                let expected = (col == row % 16).then_some((row * 10) as u32);
                assert_eq!(table.get(row, col), expected, "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn comb_lookup_misses_are_none() {
        let table = diagonal(8, 8);
        for row in 0..8 {
            for col in 0..8 {
                if col != row {
                    assert_eq!(table.get(row, col), None);
                }
            }
        }
    }

    #[test]
    fn comb_check_property_holds() {
        let rows = 16;
        let cols = 8;
        let entries: Vec<Option<u32>> = (0..rows * cols)
            .map(|i| (i % 5 == 0).then_some(i as u32))
            .collect();
        let comb = CombVec::place(rows, cols, &entries);

        for row in 0..rows {
            for col in 0..cols {
                let filled = entries[row * cols + col].is_some();
                assert_eq!(comb.check_owns(row, col), filled, "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn empty_rows_never_resolve() {
        let table = Table::build(4, 4, |row, col| (row == 0 && col == 0).then_some(7));
        for col in 0..4 {
            assert_eq!(table.get(3, col), None);
        }
        assert_eq!(table.get(0, 0), Some(7));
    }

    #[test]
    fn values_equal_to_sentinel_cannot_occur() {
        // The generator contract forbids NO_ENTRY as a value; entries are
        // state numbers or alternative counts, both far below u32::MAX.
        let table = Table::build(2, 2, |_, _| Some(0));
        assert_eq!(table.get(1, 1), Some(0));
    }
}
