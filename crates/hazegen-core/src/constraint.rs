//! Per-unit constraint tables: exclusion, presence, final-presence, absence,
//! final-absence.
//!
//! Built once by the checker, consulted by [`ResvSet::in_conflict`] for every
//! compatibility test during automaton construction.
//!
//! [`ResvSet::in_conflict`]: crate::resv::ResvSet::in_conflict

use crate::resv::Geometry;

/// A single-cycle unit mask: one bit per unit, `unit_words` words wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMask {
    words: Box<[u64]>,
}

impl UnitMask {
    pub fn empty(geom: &Geometry) -> Self {
        Self {
            words: vec![0u64; geom.unit_words()].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn set(&mut self, unit: usize) {
        self.words[unit / 64] |= 1u64 << (unit % 64);
    }

    #[inline]
    pub fn test(&self, unit: usize) -> bool {
        self.words[unit / 64] >> (unit % 64) & 1 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Whether every bit of `self` is also set in `mask`.
    pub fn subset_of(&self, mask: &[u64]) -> bool {
        self.words.iter().zip(mask.iter()).all(|(p, m)| p & !m == 0)
    }

    /// Whether any bit of `self` is set in `mask`.
    pub fn intersects(&self, mask: &[u64]) -> bool {
        self.words.iter().zip(mask.iter()).any(|(p, m)| p & m != 0)
    }
}

/// Constraints attached to one unit.
#[derive(Debug, Clone)]
pub struct UnitConstraints {
    /// Units that may never share a cycle with this one.
    pub excl: UnitMask,
    /// When this unit is reserved, at least one of these groups must also be
    /// reserved on the same cycle (checked against the other operand).
    pub presence: Vec<UnitMask>,
    /// Like `presence`, but checked against the union of both operands.
    pub final_presence: Vec<UnitMask>,
    /// When this unit is reserved, none of these groups may be fully
    /// reserved on the same cycle (checked against the other operand).
    pub absence: Vec<UnitMask>,
    /// Like `absence`, but checked against the union of both operands.
    pub final_absence: Vec<UnitMask>,
}

impl UnitConstraints {
    pub fn new(geom: &Geometry) -> Self {
        Self {
            excl: UnitMask::empty(geom),
            presence: Vec::new(),
            final_presence: Vec::new(),
            absence: Vec::new(),
            final_absence: Vec::new(),
        }
    }

    pub fn is_trivial(&self) -> bool {
        self.excl.is_empty()
            && self.presence.is_empty()
            && self.final_presence.is_empty()
            && self.absence.is_empty()
            && self.final_absence.is_empty()
    }
}

/// Constraint tables for every unit of a description.
#[derive(Debug, Clone)]
pub struct ConstraintTables {
    units: Vec<UnitConstraints>,
    trivial: bool,
}

impl ConstraintTables {
    pub fn new(geom: &Geometry, unit_count: usize) -> Self {
        Self {
            units: (0..unit_count).map(|_| UnitConstraints::new(geom)).collect(),
            trivial: true,
        }
    }

    pub fn unit(&self, unit: usize) -> &UnitConstraints {
        &self.units[unit]
    }

    pub fn unit_mut(&mut self, unit: usize) -> &mut UnitConstraints {
        self.trivial = false;
        &mut self.units[unit]
    }

    /// True when no unit carries any constraint; lets the conflict test skip
    /// the per-cycle walk entirely.
    pub fn is_trivial(&self) -> bool {
        self.trivial || self.units.iter().all(|u| u.is_trivial())
    }

    /// Whether a unit appears in any constraint, in either role.
    pub fn involves_unit(&self, unit: usize) -> bool {
        if self.is_trivial() {
            return false;
        }
        if !self.units[unit].is_trivial() {
            return true;
        }
        self.units.iter().any(|c| {
            c.excl.test(unit)
                || c.presence.iter().any(|p| p.test(unit))
                || c.final_presence.iter().any(|p| p.test(unit))
                || c.absence.iter().any(|p| p.test(unit))
                || c.final_absence.iter().any(|p| p.test(unit))
        })
    }

    /// Check one cycle, one direction: for every unit set in `a`, are the
    /// constraints satisfied with respect to `b` (or the union for the
    /// final variants)?
    pub(crate) fn cycle_violated(&self, geom: &Geometry, a: &[u64], b: &[u64]) -> bool {
        let union: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| x | y).collect();

        for unit in 0..geom.units {
            if a[unit / 64] >> (unit % 64) & 1 == 0 {
                continue;
            }
            let c = &self.units[unit];

            if c.excl.intersects(b) {
                return true;
            }
            if !c.presence.is_empty() && !c.presence.iter().any(|p| p.subset_of(b)) {
                return true;
            }
            if !c.final_presence.is_empty()
                && !c.final_presence.iter().any(|p| p.subset_of(&union))
            {
                return true;
            }
            if c.absence.iter().any(|p| p.subset_of(b)) {
                return true;
            }
            if c.final_absence.iter().any(|p| p.subset_of(&union)) {
                return true;
            }
        }
        false
    }
}
