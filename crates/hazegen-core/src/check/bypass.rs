//! Pass 7: bypass resolution.
//!
//! Bypasses link by instruction name. Unknown endpoints are errors; a
//! duplicate bypass with the same latency is a downgradable complaint, with
//! a different latency an outright contradiction.

use super::{BypassLink, Checker};

pub(crate) fn run(checker: &mut Checker) {
    let bypasses = std::mem::take(&mut checker.bypasses);
    for b in bypasses {
        let out = checker.insn_names.get(&b.out_insn).copied();
        let inp = checker.insn_names.get(&b.in_insn).copied();

        if out.is_none() {
            checker.diags.error(
                format!("undeclared instruction `{}` in bypass", b.out_insn),
                &b.out_insn,
            );
        }
        if inp.is_none() {
            checker.diags.error(
                format!("undeclared instruction `{}` in bypass", b.in_insn),
                &b.in_insn,
            );
        }
        let (Some(out), Some(inp)) = (out, inp) else {
            continue;
        };

        if b.latency < 0 {
            checker.diags.error(
                format!(
                    "negative latency {} in bypass between `{}` and `{}`",
                    b.latency, b.out_insn, b.in_insn
                ),
                &b.out_insn,
            );
            continue;
        }

        let existing = checker.insns[out.index()]
            .bypasses
            .iter()
            .find(|link| link.to == inp)
            .cloned();
        match existing {
            Some(link) if link.latency == b.latency => {
                checker.diags.error_unless_permissive(
                    checker.options.permissive,
                    format!(
                        "the same bypass between `{}` and `{}` is already defined",
                        b.out_insn, b.in_insn
                    ),
                    &b.out_insn,
                );
            }
            Some(_) => {
                checker.diags.error(
                    format!(
                        "bypass between `{}` and `{}` is already defined with another latency",
                        b.out_insn, b.in_insn
                    ),
                    &b.out_insn,
                );
            }
            None => {
                checker.insns[out.index()].bypasses.push(BypassLink {
                    latency: b.latency,
                    to: inp,
                    guard: b.guard,
                });
            }
        }
    }
}
