//! Regexp canonicalization.
//!
//! Three rewrite rules applied bottom-up to a fixed point:
//!
//! 1. **Unroll**: `Repeat(R, n)` becomes a sequence of n copies.
//! 2. **Flatten**: nested containers of the same kind merge; single-child
//!    containers collapse.
//! 3. **Distribute**: `OneOf` lifts out of `Sequence` and `AllOf`, and an
//!    `AllOf` over sequences becomes a sequence of per-position `AllOf`s.
//!
//! The result is then shaped into the canonical alternation-of-alternatives
//! form: a top-level `OneOf` whose alternatives are `Sequence`s of `Unit`,
//! `Nothing`, or `AllOf`-of-units elements.

use super::ast::Regexp;
use crate::ids::UnitId;

/// Canonicalize a resolved regexp (no `Name` or `Reserv` nodes remain).
pub fn canonicalize(mut re: Regexp) -> Regexp {
    loop {
        let mut changed = false;
        re = unroll(re, &mut changed);
        re = flatten(re, &mut changed);
        re = distribute(re, &mut changed);
        if !changed {
            break;
        }
    }
    into_shape(re)
}

/// Extract the canonical alternatives: per alternative, per cycle, the units
/// reserved on that cycle.
///
/// Panics when the regexp is not in canonical form; that is an internal
/// invariant violation, not a user error.
pub fn canonical_alternatives(re: &Regexp) -> Vec<Vec<Vec<UnitId>>> {
    let Regexp::OneOf(alts) = re else {
        panic!("canonical regexp must be a top-level OneOf, got {:?}", re);
    };
    alts.iter()
        .map(|alt| {
            let Regexp::Sequence(elems) = alt else {
                panic!("canonical alternative must be a Sequence, got {:?}", alt);
            };
            elems.iter().map(cycle_units).collect()
        })
        .collect()
}

fn cycle_units(el: &Regexp) -> Vec<UnitId> {
    match el {
        Regexp::Unit(u) => vec![*u],
        Regexp::Nothing => Vec::new(),
        Regexp::AllOf(children) => children
            .iter()
            .filter_map(|c| match c {
                Regexp::Unit(u) => Some(*u),
                Regexp::Nothing => None,
                other => panic!("canonical AllOf may only hold units, got {:?}", other),
            })
            .collect(),
        other => panic!("non-canonical sequence element {:?}", other),
    }
}

/// T1: repeat unrolling. Counts below 2 are rejected by the parser.
fn unroll(re: Regexp, changed: &mut bool) -> Regexp {
    match re {
        Regexp::Repeat(child, n) => {
            let child = unroll(*child, changed);
            *changed = true;
            Regexp::Sequence(vec![child; n as usize])
        }
        Regexp::Sequence(cs) => Regexp::Sequence(unroll_all(cs, changed)),
        Regexp::AllOf(cs) => Regexp::AllOf(unroll_all(cs, changed)),
        Regexp::OneOf(cs) => Regexp::OneOf(unroll_all(cs, changed)),
        leaf => leaf,
    }
}

fn unroll_all(cs: Vec<Regexp>, changed: &mut bool) -> Vec<Regexp> {
    cs.into_iter().map(|c| unroll(c, changed)).collect()
}

/// T2: merge nested containers of the same kind and collapse single-child
/// containers.
fn flatten(re: Regexp, changed: &mut bool) -> Regexp {
    match re {
        Regexp::Sequence(cs) => flatten_container(cs, changed, is_sequence, Regexp::Sequence),
        Regexp::AllOf(cs) => flatten_container(cs, changed, is_all_of, Regexp::AllOf),
        Regexp::OneOf(cs) => flatten_container(cs, changed, is_one_of, Regexp::OneOf),
        Regexp::Repeat(child, n) => Regexp::Repeat(Box::new(flatten(*child, changed)), n),
        leaf => leaf,
    }
}

fn is_sequence(re: &Regexp) -> bool {
    matches!(re, Regexp::Sequence(_))
}

fn is_all_of(re: &Regexp) -> bool {
    matches!(re, Regexp::AllOf(_))
}

fn is_one_of(re: &Regexp) -> bool {
    matches!(re, Regexp::OneOf(_))
}

fn flatten_container(
    cs: Vec<Regexp>,
    changed: &mut bool,
    same_kind: fn(&Regexp) -> bool,
    build: fn(Vec<Regexp>) -> Regexp,
) -> Regexp {
    let mut out = Vec::with_capacity(cs.len());
    for child in cs {
        let child = flatten(child, changed);
        if same_kind(&child) {
            *changed = true;
            match child {
                Regexp::Sequence(inner) | Regexp::AllOf(inner) | Regexp::OneOf(inner) => {
                    out.extend(inner);
                }
                _ => unreachable!(),
            }
        } else {
            out.push(child);
        }
    }
    if out.len() == 1 {
        *changed = true;
        out.pop().unwrap()
    } else {
        build(out)
    }
}

/// T3: lift `OneOf` to the top and serialize parallel sequences.
fn distribute(re: Regexp, changed: &mut bool) -> Regexp {
    match re {
        Regexp::Sequence(cs) => {
            let cs: Vec<Regexp> = cs.into_iter().map(|c| distribute(c, changed)).collect();
            match cs.iter().position(is_one_of) {
                Some(i) => lift_one_of(cs, i, changed, Regexp::Sequence),
                None => Regexp::Sequence(cs),
            }
        }
        Regexp::AllOf(cs) => {
            let cs: Vec<Regexp> = cs.into_iter().map(|c| distribute(c, changed)).collect();
            if let Some(i) = cs.iter().position(is_one_of) {
                lift_one_of(cs, i, changed, Regexp::AllOf)
            } else if cs.iter().any(is_sequence) {
                *changed = true;
                compose_parallel(cs)
            } else {
                Regexp::AllOf(cs)
            }
        }
        Regexp::OneOf(cs) => {
            Regexp::OneOf(cs.into_iter().map(|c| distribute(c, changed)).collect())
        }
        Regexp::Repeat(child, n) => Regexp::Repeat(Box::new(distribute(*child, changed)), n),
        leaf => leaf,
    }
}

/// Replace the `OneOf` child at `i` with each of its alternatives in turn,
/// producing a `OneOf` of the rebuilt containers.
fn lift_one_of(
    cs: Vec<Regexp>,
    i: usize,
    changed: &mut bool,
    build: fn(Vec<Regexp>) -> Regexp,
) -> Regexp {
    *changed = true;
    let Regexp::OneOf(alts) = cs[i].clone() else {
        unreachable!();
    };
    let variants = alts
        .into_iter()
        .map(|alt| {
            let mut variant = cs.clone();
            variant[i] = alt;
            build(variant)
        })
        .collect();
    Regexp::OneOf(variants)
}

/// Parallel composition: `AllOf(Seq(a,b), Seq(c,d), u)` becomes
/// `Sequence(AllOf(a,c,u), AllOf(b,d))`, aligning sequence positions.
/// Positions a child does not reach contribute nothing; a position with no
/// contributions at all becomes `Nothing`.
fn compose_parallel(cs: Vec<Regexp>) -> Regexp {
    let len = cs
        .iter()
        .map(|c| match c {
            Regexp::Sequence(inner) => inner.len(),
            _ => 1,
        })
        .max()
        .unwrap_or(0);

    let mut positions: Vec<Vec<Regexp>> = vec![Vec::new(); len];
    for child in cs {
        match child {
            Regexp::Sequence(inner) => {
                for (p, el) in inner.into_iter().enumerate() {
                    positions[p].push(el);
                }
            }
            other => positions[0].push(other),
        }
    }

    let elems = positions
        .into_iter()
        .map(|mut elems| match elems.len() {
            0 => Regexp::Nothing,
            1 => elems.pop().unwrap(),
            _ => Regexp::AllOf(elems),
        })
        .collect();
    Regexp::Sequence(elems)
}

/// Final shaping: wrap into the top-level `OneOf` of `Sequence`s.
fn into_shape(re: Regexp) -> Regexp {
    let alts = match re {
        Regexp::OneOf(cs) => cs,
        other => vec![other],
    };
    let alts = alts
        .into_iter()
        .map(|alt| match alt {
            seq @ Regexp::Sequence(_) => seq,
            other => Regexp::Sequence(vec![other]),
        })
        .collect();
    Regexp::OneOf(alts)
}
