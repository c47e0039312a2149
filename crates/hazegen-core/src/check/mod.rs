//! Semantic checker for pipeline descriptions.
//!
//! Passes run in order, all writing into one shared [`Diagnostics`]:
//!
//! 1. `intern` - declaration interning into three name spaces, option folding,
//!    regexp parsing
//! 2. `resolve` - regexp name resolution, automaton membership checks
//! 3. `cycles` - recursive-reservation detection
//! 4. canonicalization (inline reservation refs, then transform)
//! 5. `constraints` - exclusion/presence/absence normalization
//! 6. `usage` - unused-declaration audit, per-unit cycle extents
//! 7. `bypass` - bypass endpoint resolution
//! 8. advance-cycle insertion and unit-to-automaton distribution
//!
//! Nothing aborts early; a run reports as many problems as it can. When any
//! error-severity diagnostic accumulated, automaton construction is skipped.

mod bypass;
mod constraints;
mod cycles;
mod intern;
mod resolve;
mod usage;

#[cfg(test)]
mod checker_tests;

use indexmap::IndexMap;

use crate::constraint::ConstraintTables;
use crate::decl::Decl;
use crate::diagnostics::Diagnostics;
use crate::distribute;
use crate::ids::{AutomatonId, InsnId, ReservId, UnitId};
use crate::options::Options;
use crate::regexp::{Regexp, canonicalize};
use crate::resv::Geometry;

/// Name of the synthetic instruction representing the passage of one cycle.
/// Always present, always last.
pub const ADVANCE_CYCLE_NAME: &str = "$advance_cycle";

/// A checked functional unit.
#[derive(Debug, Clone)]
pub struct UnitInfo {
    pub name: String,
    pub automaton_name: Option<String>,
    /// Owning automaton, assigned by distribution.
    pub automaton: AutomatonId,
    pub queryable: bool,
    /// Earliest cycle the unit appears on in any canonical reservation.
    pub min_occ_cycle: Option<usize>,
    /// Latest such cycle.
    pub max_occ_cycle: Option<usize>,
    /// Referenced from a regexp.
    pub used: bool,
    /// Mentioned in an exclusion/presence/absence constraint.
    pub in_constraint: bool,
}

/// A checked named reservation.
#[derive(Debug, Clone)]
pub struct ReservInfo {
    pub name: String,
    pub source: String,
    /// Resolved regexp; `None` when parsing, resolution, or cycle detection
    /// failed.
    pub regexp: Option<Regexp>,
    pub used: bool,
}

/// A checked instruction reservation.
#[derive(Debug, Clone)]
pub struct InsnInfo {
    pub name: String,
    pub condition: String,
    pub default_latency: u32,
    pub source: String,
    /// Resolved original regexp.
    pub regexp: Option<Regexp>,
    /// Canonical alternation-of-alternatives form. `None` for the synthetic
    /// advance-cycle instruction and for instructions whose regexp failed.
    pub canonical: Option<Regexp>,
    pub bypasses: Vec<BypassLink>,
}

impl InsnInfo {
    pub fn is_advance_cycle(&self) -> bool {
        self.name == ADVANCE_CYCLE_NAME
    }
}

/// An outbound bypass resolved to its destination instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassLink {
    pub latency: i32,
    pub to: InsnId,
    pub guard: Option<String>,
}

/// One automaton of the final description.
#[derive(Debug, Clone)]
pub struct AutomatonInfo {
    /// Declared name; `None` for implicitly created automata.
    pub name: Option<String>,
}

impl AutomatonInfo {
    /// Display name for dumps and diagnostics.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", index),
        }
    }
}

/// The product of the semantic checker: everything automaton construction
/// needs, plus the accumulated diagnostics.
#[derive(Debug, Clone)]
pub struct CheckedDescription {
    pub options: Options,
    pub units: Vec<UnitInfo>,
    pub reservs: Vec<ReservInfo>,
    /// Instructions in declaration order; the advance-cycle instruction is
    /// always last.
    pub insns: Vec<InsnInfo>,
    pub automata: Vec<AutomatonInfo>,
    pub constraints: ConstraintTables,
    pub geometry: Geometry,
    pub diagnostics: Diagnostics,
}

impl CheckedDescription {
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn advance_insn(&self) -> InsnId {
        InsnId::from_index(self.insns.len() - 1)
    }

    pub fn unit_names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name.clone()).collect()
    }

    /// Units of one automaton, in declaration order.
    pub fn units_of(&self, automaton: AutomatonId) -> impl Iterator<Item = UnitId> + '_ {
        self.units
            .iter()
            .enumerate()
            .filter(move |(_, u)| u.automaton == automaton)
            .map(|(i, _)| UnitId::from_index(i))
    }

    /// Queryable units in sorted-name order, the order unit codes are
    /// assigned in.
    pub fn queryable_units_sorted(&self) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.queryable)
            .map(|(i, _)| UnitId::from_index(i))
            .collect();
        units.sort_by(|a, b| self.units[a.index()].name.cmp(&self.units[b.index()].name));
        units
    }
}

/// Reference into the shared unit/reservation name space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameRef {
    Unit(UnitId),
    Reserv(ReservId),
}

/// Mutable checker state threaded through the passes.
pub(crate) struct Checker {
    pub diags: Diagnostics,
    pub options: Options,
    /// Declared automata, in declaration order.
    pub automata_names: IndexMap<String, AutomatonId>,
    pub insn_names: IndexMap<String, InsnId>,
    /// Units and reservations share one name space.
    pub decl_names: IndexMap<String, NameRef>,
    pub units: Vec<UnitInfo>,
    pub reservs: Vec<ReservInfo>,
    pub insns: Vec<InsnInfo>,
    /// Side lists consumed by later passes.
    pub exclusions: Vec<crate::decl::ExclusionDecl>,
    pub patterns: Vec<(PatternKind, crate::decl::PatternDecl)>,
    pub bypasses: Vec<crate::decl::BypassDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    Presence,
    FinalPresence,
    Absence,
    FinalAbsence,
}

/// Run the semantic checker over a declaration sequence.
pub fn check(decls: Vec<Decl>) -> CheckedDescription {
    let mut checker = Checker {
        diags: Diagnostics::new(),
        options: Options::default(),
        automata_names: IndexMap::new(),
        insn_names: IndexMap::new(),
        decl_names: IndexMap::new(),
        units: Vec::new(),
        reservs: Vec::new(),
        insns: Vec::new(),
        exclusions: Vec::new(),
        patterns: Vec::new(),
        bypasses: Vec::new(),
    };

    intern::run(&mut checker, decls);
    resolve::run(&mut checker);
    cycles::run(&mut checker);
    canonicalize_insns(&mut checker);

    // Constraint tables only need the unit count; the cycle extent is
    // computed afterwards and does not change the per-cycle mask width.
    let mask_geom = Geometry::new(checker.units.len(), 1);
    let constraints = constraints::run(&mut checker, &mask_geom);
    let max_cycles = usage::run(&mut checker);
    bypass::run(&mut checker);

    // The synthetic advance-cycle instruction: a null regexp standing for
    // the pure cycle-advance transition.
    checker.insns.push(InsnInfo {
        name: ADVANCE_CYCLE_NAME.to_string(),
        condition: String::new(),
        default_latency: 0,
        source: String::new(),
        regexp: None,
        canonical: None,
        bypasses: Vec::new(),
    });

    let automata = distribute::run(
        &mut checker.units,
        &checker.automata_names,
        checker.options.split,
        &mut checker.diags,
    );
    distribute::validate(
        &checker.insns,
        &checker.units,
        &automata,
        &mut checker.diags,
    );

    CheckedDescription {
        options: checker.options,
        geometry: Geometry::new(checker.units.len(), max_cycles),
        units: checker.units,
        reservs: checker.reservs,
        insns: checker.insns,
        automata,
        constraints,
        diagnostics: checker.diags,
    }
}

/// Inline reservation references and canonicalize every instruction regexp.
fn canonicalize_insns(checker: &mut Checker) {
    for i in 0..checker.insns.len() {
        let Some(regexp) = checker.insns[i].regexp.clone() else {
            continue;
        };
        let inlined = inline_reservs(&regexp, &checker.reservs);
        checker.insns[i].canonical = Some(canonicalize(inlined));
    }
}

/// Deep-copy reservation references into place. Reservations that failed
/// checking inline as `Nothing`; the error is already on record and
/// generation will be suppressed.
fn inline_reservs(re: &Regexp, reservs: &[ReservInfo]) -> Regexp {
    match re {
        Regexp::Reserv(id) => match &reservs[id.index()].regexp {
            Some(inner) => inline_reservs(inner, reservs),
            None => Regexp::Nothing,
        },
        Regexp::Sequence(cs) => {
            Regexp::Sequence(cs.iter().map(|c| inline_reservs(c, reservs)).collect())
        }
        Regexp::AllOf(cs) => {
            Regexp::AllOf(cs.iter().map(|c| inline_reservs(c, reservs)).collect())
        }
        Regexp::OneOf(cs) => {
            Regexp::OneOf(cs.iter().map(|c| inline_reservs(c, reservs)).collect())
        }
        Regexp::Repeat(child, n) => {
            Regexp::Repeat(Box::new(inline_reservs(child, reservs)), *n)
        }
        leaf => leaf.clone(),
    }
}
