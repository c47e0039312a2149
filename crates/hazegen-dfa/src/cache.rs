//! Instruction-code cache.
//!
//! Schedulers identify instructions by their own external ids; the cache
//! memoizes the mapping onto internal instruction numbers so the resolver
//! runs once per external id. `dfa_start` allocates, `dfa_clean_insn_cache`
//! invalidates every memoized entry, `dfa_finish` releases.

use hazegen_core::InsnId;

use crate::runtime::Dfa;

/// Memoized external-id → instruction-number mapping.
#[derive(Debug, Default)]
pub struct InsnCache {
    codes: Vec<Option<InsnId>>,
}

impl Dfa {
    /// Allocate an instruction-code cache for a scheduling session.
    pub fn dfa_start(&self) -> InsnCache {
        InsnCache {
            codes: vec![None; self.insn_count()],
        }
    }
}

impl InsnCache {
    /// The instruction number for an external id, resolving and memoizing
    /// on first use.
    pub fn dfa_insn_code(&mut self, uid: usize, resolve: impl FnOnce() -> InsnId) -> InsnId {
        if uid >= self.codes.len() {
            self.codes.resize(uid + 1, None);
        }
        match self.codes[uid] {
            Some(code) => code,
            None => {
                let code = resolve();
                self.codes[uid] = Some(code);
                code
            }
        }
    }

    /// Drop every memoized entry; the next lookup re-resolves.
    pub fn dfa_clean_insn_cache(&mut self) {
        self.codes.fill(None);
    }

    /// Release the cache.
    pub fn dfa_finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memoizes_first_resolution() {
        let mut cache = InsnCache::default();
        let mut calls = 0;
        let code = cache.dfa_insn_code(5, || {
            calls += 1;
            InsnId(2)
        });
        assert_eq!(code, InsnId(2));

        // A second lookup must not re-resolve.
        let code = cache.dfa_insn_code(5, || {
            calls += 1;
            InsnId(9)
        });
        assert_eq!(code, InsnId(2));
        assert_eq!(calls, 1);
    }

    #[test]
    fn cleaning_forces_re_resolution() {
        let mut cache = InsnCache::default();
        cache.dfa_insn_code(0, || InsnId(1));
        cache.dfa_clean_insn_cache();
        let code = cache.dfa_insn_code(0, || InsnId(3));
        assert_eq!(code, InsnId(3));
    }
}
