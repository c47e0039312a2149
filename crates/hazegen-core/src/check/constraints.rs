//! Pass 5: constraint normalization.
//!
//! Exclusion sets become symmetric per-unit masks; presence/absence patterns
//! attach to each unit of their LHS name set. Conflicting requirements are
//! reported here, after all constraint declarations are folded in.

use crate::constraint::{ConstraintTables, UnitMask};
use crate::ids::UnitId;
use crate::resv::Geometry;

use super::{Checker, NameRef, PatternKind};

pub(crate) fn run(checker: &mut Checker, geom: &Geometry) -> ConstraintTables {
    let mut tables = ConstraintTables::new(geom, checker.units.len());

    let exclusions = std::mem::take(&mut checker.exclusions);
    for excl in &exclusions {
        let a = resolve_units(checker, &excl.names_a, "exclusion set");
        let b = resolve_units(checker, &excl.names_b, "exclusion set");
        for &ua in &a {
            for &ub in &b {
                if ua == ub {
                    let name = checker.units[ua.index()].name.clone();
                    checker
                        .diags
                        .error(format!("unit `{}` excludes itself", name), &name);
                    continue;
                }
                check_same_automaton(checker, ua, ub);
                tables.unit_mut(ua.index()).excl.set(ub.index());
                tables.unit_mut(ub.index()).excl.set(ua.index());
                checker.units[ua.index()].in_constraint = true;
                checker.units[ub.index()].in_constraint = true;
            }
        }
    }

    let patterns = std::mem::take(&mut checker.patterns);
    for (kind, decl) in &patterns {
        let lhs = resolve_units(checker, &decl.names, "pattern set");
        let mut groups: Vec<UnitMask> = Vec::new();
        for group in &decl.patterns {
            if group.is_empty() {
                checker
                    .diags
                    .error("empty pattern group", decl.names.join(" "));
                continue;
            }
            let units = resolve_units(checker, group, "pattern group");
            let mut mask = UnitMask::empty(geom);
            for u in units {
                mask.set(u.index());
                checker.units[u.index()].in_constraint = true;
            }
            groups.push(mask);
        }

        for &u in &lhs {
            checker.units[u.index()].in_constraint = true;
            if matches!(kind, PatternKind::Absence | PatternKind::FinalAbsence)
                && groups.iter().any(|g| g.test(u.index()))
            {
                let name = checker.units[u.index()].name.clone();
                checker
                    .diags
                    .error(format!("unit `{}` requires its own absence", name), &name);
            }
            let list = match kind {
                PatternKind::Presence => &mut tables.unit_mut(u.index()).presence,
                PatternKind::FinalPresence => &mut tables.unit_mut(u.index()).final_presence,
                PatternKind::Absence => &mut tables.unit_mut(u.index()).absence,
                PatternKind::FinalAbsence => &mut tables.unit_mut(u.index()).final_absence,
            };
            list.extend(groups.iter().cloned());
        }
    }

    report_conflicts(checker, &tables);
    tables
}

/// Cross-requirement conflicts: a unit that excludes `y` cannot also require
/// the presence of `y`; a unit cannot require both presence and absence of
/// the same companion.
fn report_conflicts(checker: &mut Checker, tables: &ConstraintTables) {
    let permissive = checker.options.permissive;
    for u in 0..checker.units.len() {
        let c = tables.unit(u);
        for y in 0..checker.units.len() {
            let in_presence = c.presence.iter().any(|p| p.test(y))
                || c.final_presence.iter().any(|p| p.test(y));
            if !in_presence {
                continue;
            }
            let u_name = checker.units[u].name.clone();
            let y_name = checker.units[y].name.clone();
            if c.excl.test(y) {
                checker.diags.error_unless_permissive(
                    permissive,
                    format!("unit `{}` excludes and requires presence of `{}`", u_name, y_name),
                    &u_name,
                );
            }
            if c.absence.iter().any(|p| p.test(y)) || c.final_absence.iter().any(|p| p.test(y)) {
                checker.diags.error_unless_permissive(
                    permissive,
                    format!(
                        "unit `{}` requires absence and presence of `{}`",
                        u_name, y_name
                    ),
                    &u_name,
                );
            }
        }
    }
}

fn check_same_automaton(checker: &mut Checker, a: UnitId, b: UnitId) {
    let am_a = &checker.units[a.index()].automaton_name;
    let am_b = &checker.units[b.index()].automaton_name;
    if let (Some(na), Some(nb)) = (am_a, am_b)
        && na != nb
    {
        checker.diags.error(
            format!(
                "units `{}` and `{}` in exclusion set belong to different automata",
                checker.units[a.index()].name,
                checker.units[b.index()].name
            ),
            checker.units[a.index()].name.clone(),
        );
    }
}

/// Resolve a list of names that must all be units.
fn resolve_units(checker: &mut Checker, names: &[String], what: &str) -> Vec<UnitId> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        match checker.decl_names.get(name) {
            Some(NameRef::Unit(id)) => out.push(*id),
            Some(NameRef::Reserv(_)) => {
                checker.diags.error(
                    format!("`{}` in {} is not a unit", name, what),
                    name,
                );
            }
            None => {
                checker
                    .diags
                    .error(format!("undeclared unit `{}` in {}", name, what), name);
            }
        }
    }
    out
}
