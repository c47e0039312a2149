//! Pass 3: recursive-reservation detection.
//!
//! A reservation whose regexp transitively references itself cannot be
//! inlined. Detection is a DFS tagged by a monotonically increasing pass
//! number, one pass per reservation, so visited marks never need clearing.

use crate::regexp::Regexp;

use super::Checker;

pub(crate) fn run(checker: &mut Checker) {
    let count = checker.reservs.len();
    let mut pass_nums = vec![0u32; count];
    let mut curr_pass = 0u32;
    let mut cyclic = vec![false; count];

    for root in 0..count {
        curr_pass += 1;
        let Some(re) = &checker.reservs[root].regexp else {
            continue;
        };
        if reaches(re, root, checker, &mut pass_nums, curr_pass) {
            cyclic[root] = true;
        }
    }

    for root in 0..count {
        if cyclic[root] {
            let name = checker.reservs[root].name.clone();
            checker.diags.error(
                format!("cycle in definition of reservation `{}`", name),
                &name,
            );
            // The regexp must not be inlined; clearing it breaks the loop.
            checker.reservs[root].regexp = None;
        }
    }
}

fn reaches(
    re: &Regexp,
    root: usize,
    checker: &Checker,
    pass_nums: &mut [u32],
    curr_pass: u32,
) -> bool {
    match re {
        Regexp::Reserv(id) => {
            let i = id.index();
            if i == root {
                return true;
            }
            if pass_nums[i] == curr_pass {
                return false;
            }
            pass_nums[i] = curr_pass;
            match &checker.reservs[i].regexp {
                Some(inner) => reaches(inner, root, checker, pass_nums, curr_pass),
                None => false,
            }
        }
        Regexp::Sequence(cs) | Regexp::AllOf(cs) | Regexp::OneOf(cs) => cs
            .iter()
            .any(|c| reaches(c, root, checker, pass_nums, curr_pass)),
        Regexp::Repeat(child, _) => reaches(child, root, checker, pass_nums, curr_pass),
        _ => false,
    }
}
