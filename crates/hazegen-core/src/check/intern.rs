//! Pass 1: declaration interning.
//!
//! Automata, instructions, and units/reservations each live in their own
//! name space. Options fold first so the permissive flag is in effect for
//! every later downgrade decision.

use crate::decl::Decl;
use crate::diagnostics::RegexpSpan;
use crate::ids::{AutomatonId, InsnId, ReservId, UnitId};
use crate::regexp::parse;

use super::{Checker, InsnInfo, NameRef, PatternKind, ReservInfo, UnitInfo};

pub(crate) fn run(checker: &mut Checker, decls: Vec<Decl>) {
    // Options first: `w` must already be known when interning reports
    // downgradable duplicates.
    for decl in &decls {
        if let Decl::Option(opt) = decl {
            let mut opts = checker.options;
            opts.apply(opt, &mut checker.diags);
            checker.options = opts;
        }
    }

    for decl in decls {
        match decl {
            Decl::Option(_) => {}
            Decl::Automaton(a) => {
                if checker.automata_names.contains_key(&a.name) {
                    checker.diags.error_unless_permissive(
                        checker.options.permissive,
                        format!("repeated declaration of automaton `{}`", a.name),
                        &a.name,
                    );
                } else {
                    let id = AutomatonId::from_index(checker.automata_names.len());
                    checker.automata_names.insert(a.name, id);
                }
            }
            Decl::Unit(u) => {
                if checker.decl_names.contains_key(&u.name) {
                    checker.diags.error(
                        format!("repeated declaration of `{}`", u.name),
                        &u.name,
                    );
                    continue;
                }
                let id = UnitId::from_index(checker.units.len());
                checker.decl_names.insert(u.name.clone(), NameRef::Unit(id));
                checker.units.push(UnitInfo {
                    name: u.name,
                    automaton_name: u.automaton,
                    automaton: AutomatonId(0),
                    queryable: u.queryable,
                    min_occ_cycle: None,
                    max_occ_cycle: None,
                    used: false,
                    in_constraint: false,
                });
            }
            Decl::Reservation(r) => {
                if checker.decl_names.contains_key(&r.name) {
                    checker.diags.error(
                        format!("repeated declaration of `{}`", r.name),
                        &r.name,
                    );
                    continue;
                }
                let regexp = parse_regexp(checker, &r.name, &r.regexp);
                let id = ReservId::from_index(checker.reservs.len());
                checker
                    .decl_names
                    .insert(r.name.clone(), NameRef::Reserv(id));
                checker.reservs.push(ReservInfo {
                    name: r.name,
                    source: r.regexp,
                    regexp,
                    used: false,
                });
            }
            Decl::InsnReservation(insn) => {
                if checker.insn_names.contains_key(&insn.name) {
                    checker.diags.error(
                        format!("repeated declaration of instruction `{}`", insn.name),
                        &insn.name,
                    );
                    continue;
                }
                if insn.default_latency < 0 {
                    checker.diags.error(
                        format!(
                            "negative default latency {} for instruction `{}`",
                            insn.default_latency, insn.name
                        ),
                        &insn.name,
                    );
                }
                let regexp = parse_regexp(checker, &insn.name, &insn.regexp);
                let id = InsnId::from_index(checker.insns.len());
                checker.insn_names.insert(insn.name.clone(), id);
                checker.insns.push(InsnInfo {
                    name: insn.name,
                    condition: insn.condition,
                    default_latency: insn.default_latency.max(0) as u32,
                    source: insn.regexp,
                    regexp,
                    canonical: None,
                    bypasses: Vec::new(),
                });
            }
            Decl::Exclusion(e) => checker.exclusions.push(e),
            Decl::Presence(p) => checker.patterns.push((PatternKind::Presence, p)),
            Decl::FinalPresence(p) => checker.patterns.push((PatternKind::FinalPresence, p)),
            Decl::Absence(p) => checker.patterns.push((PatternKind::Absence, p)),
            Decl::FinalAbsence(p) => checker.patterns.push((PatternKind::FinalAbsence, p)),
            Decl::Bypass(b) => checker.bypasses.push(b),
        }
    }
}

fn parse_regexp(
    checker: &mut Checker,
    construct: &str,
    source: &str,
) -> Option<crate::regexp::Regexp> {
    match parse(source) {
        Ok(re) => Some(re),
        Err(err) => {
            checker.diags.error_in_regexp(
                err.message,
                construct,
                RegexpSpan::new(source, err.span),
            );
            None
        }
    }
}
