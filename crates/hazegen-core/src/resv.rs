//! Reservation sets: fixed-width bit strings over cycle × unit.
//!
//! A reservation set records which units are busy on which future cycles.
//! Each cycle occupies a whole number of `u64` words so that per-cycle unit
//! masks can be sliced without bit gymnastics; the logical bit for
//! `(cycle, unit)` is word `cycle * unit_words + unit / 64`, bit `unit % 64`.

use crate::constraint::ConstraintTables;

/// The shape of every reservation set in one generation run: how many units
/// exist and how many cycles the longest reservation spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub units: usize,
    pub cycles: usize,
    unit_words: usize,
}

impl Geometry {
    pub fn new(units: usize, cycles: usize) -> Self {
        Self {
            units,
            cycles: cycles.max(1),
            unit_words: units.div_ceil(64).max(1),
        }
    }

    /// Words per cycle.
    #[inline]
    pub fn unit_words(&self) -> usize {
        self.unit_words
    }

    /// Total words per reservation set.
    #[inline]
    pub fn words(&self) -> usize {
        self.unit_words * self.cycles
    }
}

/// A reservation set. Ordering and hashing are lexicographic over words,
/// which is all the interning tables need.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResvSet {
    words: Box<[u64]>,
}

impl ResvSet {
    pub fn empty(geom: &Geometry) -> Self {
        Self {
            words: vec![0u64; geom.words()].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn set(&mut self, geom: &Geometry, cycle: usize, unit: usize) {
        debug_assert!(cycle < geom.cycles && unit < geom.units);
        self.words[cycle * geom.unit_words + unit / 64] |= 1u64 << (unit % 64);
    }

    #[inline]
    pub fn test(&self, geom: &Geometry, cycle: usize, unit: usize) -> bool {
        debug_assert!(cycle < geom.cycles && unit < geom.units);
        self.words[cycle * geom.unit_words + unit / 64] >> (unit % 64) & 1 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Union, in place.
    pub fn or_assign(&mut self, other: &ResvSet) {
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w |= o;
        }
    }

    /// Intersection, in place.
    pub fn and_assign(&mut self, other: &ResvSet) {
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= o;
        }
    }

    pub fn or(&self, other: &ResvSet) -> ResvSet {
        let mut out = self.clone();
        out.or_assign(other);
        out
    }

    pub fn and(&self, other: &ResvSet) -> ResvSet {
        let mut out = self.clone();
        out.and_assign(other);
        out
    }

    /// Advance one CPU cycle: drop cycle 0, move every later cycle one step
    /// closer, zero-fill the last cycle.
    pub fn shift(&self, geom: &Geometry) -> ResvSet {
        let uw = geom.unit_words;
        let mut out = ResvSet::empty(geom);
        out.words[..(geom.cycles - 1) * uw].copy_from_slice(&self.words[uw..]);
        out
    }

    /// Plain bit intersection, ignoring constraint tables.
    pub fn intersects(&self, other: &ResvSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// The per-cycle unit mask as a word slice.
    #[inline]
    pub fn cycle_mask(&self, geom: &Geometry, cycle: usize) -> &[u64] {
        &self.words[cycle * geom.unit_words..(cycle + 1) * geom.unit_words]
    }

    /// Units set on the given cycle, in ascending unit order.
    pub fn units_on_cycle<'a>(
        &'a self,
        geom: &'a Geometry,
        cycle: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let mask = self.cycle_mask(geom, cycle);
        (0..geom.units).filter(move |&u| mask[u / 64] >> (u % 64) & 1 != 0)
    }

    /// Whether two reservation sets conflict: plain bit overlap, or any
    /// violation of the exclusion / presence / absence constraints for a unit
    /// mentioned in either operand.
    pub fn in_conflict(
        &self,
        other: &ResvSet,
        geom: &Geometry,
        constraints: &ConstraintTables,
    ) -> bool {
        if self.intersects(other) {
            return true;
        }
        if constraints.is_trivial() {
            return false;
        }
        for cycle in 0..geom.cycles {
            let a = self.cycle_mask(geom, cycle);
            let b = other.cycle_mask(geom, cycle);
            if constraints.cycle_violated(geom, a, b) || constraints.cycle_violated(geom, b, a) {
                return true;
            }
        }
        false
    }

    pub fn raw_words(&self) -> &[u64] {
        &self.words
    }

    /// Render as `cycle: unit+unit, cycle: ...` using the given unit names;
    /// empty sets render as `<empty>`.
    pub fn display<'a>(&'a self, geom: &'a Geometry, unit_names: &'a [String]) -> String {
        let mut cycles = Vec::new();
        for cycle in 0..geom.cycles {
            let units: Vec<&str> = self
                .units_on_cycle(geom, cycle)
                .map(|u| unit_names[u].as_str())
                .collect();
            if !units.is_empty() {
                cycles.push(format!("{}: {}", cycle, units.join("+")));
            }
        }
        if cycles.is_empty() {
            "<empty>".to_string()
        } else {
            cycles.join(", ")
        }
    }
}
