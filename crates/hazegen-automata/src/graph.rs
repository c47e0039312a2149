//! Interned state graphs.
//!
//! States live in a flat `Vec`, referenced by [`StateId`]; ids are assigned
//! monotonically at first interning and never reused, so id order is exactly
//! the "unique number" order downstream algorithms sort by. Arcs are owned
//! by their origin state in insertion order; `add_arc` is idempotent on
//! `(to, insn)`.

use rustc_hash::FxHashMap;

use hazegen_core::{Geometry, InsnId, ResvSet};

/// Index into [`StateGraph::states`], assigned monotonically at interning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outgoing arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcOut {
    pub insn: InsnId,
    pub to: StateId,
    /// Number of alternative reservations this transition stands for.
    pub state_alts: u32,
}

/// One automaton state: atomic (a reservation set) or compound (a sorted
/// list of component states from subset construction or minimization
/// merging).
#[derive(Debug, Clone)]
pub struct State {
    /// Reservation set; meaningful for atomic states only.
    pub resv: ResvSet,
    /// Component states, sorted by id, deduplicated. Empty for atomic
    /// states.
    pub components: Vec<StateId>,
    pub arcs: Vec<ArcOut>,
    /// Reached only through advance-cycle arcs.
    pub new_cycle: bool,
}

impl State {
    pub fn is_compound(&self) -> bool {
        !self.components.is_empty()
    }
}

/// Interning key: atomic states by reservation words, compound states by
/// their sorted component id sequence. Interning tables are per automaton,
/// which keeps the automata's state spaces disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StateKey {
    Atomic(Box<[u64]>),
    Compound(Box<[u32]>),
}

/// The state graph of one automaton.
#[derive(Debug, Clone)]
pub struct StateGraph {
    states: Vec<State>,
    interned: FxHashMap<StateKey, StateId>,
}

impl StateGraph {
    /// Create the graph with its start state: the empty reservation.
    pub fn new(geom: &Geometry) -> Self {
        let mut graph = Self {
            states: Vec::new(),
            interned: FxHashMap::default(),
        };
        graph.intern_atomic(ResvSet::empty(geom));
        graph
    }

    pub fn start(&self) -> StateId {
        StateId(0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    #[inline]
    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.index()]
    }

    /// Intern an atomic state. Returns the id and whether it was new.
    pub fn intern_atomic(&mut self, resv: ResvSet) -> (StateId, bool) {
        let key = StateKey::Atomic(resv.raw_words().into());
        if let Some(&id) = self.interned.get(&key) {
            return (id, false);
        }
        let id = StateId::from_index(self.states.len());
        self.states.push(State {
            resv,
            components: Vec::new(),
            arcs: Vec::new(),
            new_cycle: false,
        });
        self.interned.insert(key, id);
        (id, true)
    }

    /// Intern a compound state over the given components, which must already
    /// be sorted and deduplicated. The reservation set of a compound state
    /// is unused; it holds the empty set of the same geometry as the first
    /// component.
    pub fn intern_compound(&mut self, components: Vec<StateId>, geom: &Geometry) -> (StateId, bool) {
        debug_assert!(!components.is_empty(), "compound state with no components");
        debug_assert!(
            components.windows(2).all(|w| w[0] < w[1]),
            "compound components must be sorted and unique"
        );
        let key = StateKey::Compound(components.iter().map(|id| id.0).collect());
        if let Some(&id) = self.interned.get(&key) {
            return (id, false);
        }
        let id = StateId::from_index(self.states.len());
        self.states.push(State {
            resv: ResvSet::empty(geom),
            components,
            arcs: Vec::new(),
            new_cycle: false,
        });
        self.interned.insert(key, id);
        (id, true)
    }

    /// Add an arc; parallel arcs with the same `(to, insn)` are forbidden,
    /// so a duplicate is silently dropped. Returns whether the arc was new.
    pub fn add_arc(&mut self, from: StateId, to: StateId, insn: InsnId, state_alts: u32) -> bool {
        let arcs = &mut self.states[from.index()].arcs;
        if arcs.iter().any(|a| a.to == to && a.insn == insn) {
            return false;
        }
        arcs.push(ArcOut {
            insn,
            to,
            state_alts,
        });
        true
    }

    /// The observation reservation of a state: its own for atomic states,
    /// the first component's (transitively) for compound states.
    pub fn observation_resv(&self, id: StateId) -> &ResvSet {
        let state = self.state(id);
        match state.components.first() {
            Some(&first) => self.observation_resv(first),
            None => &state.resv,
        }
    }

    /// States reachable from the start state, in depth-first preorder with
    /// arcs followed in insertion order. The start state comes first.
    pub fn reachable(&self) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.start()];
        visited[self.start().index()] = true;
        while let Some(id) = stack.pop() {
            order.push(id);
            // Reverse push keeps preorder aligned with arc insertion order.
            for arc in self.state(id).arcs.iter().rev() {
                if !visited[arc.to.index()] {
                    visited[arc.to.index()] = true;
                    stack.push(arc.to);
                }
            }
        }
        order
    }

    /// Count reachable states and arcs.
    pub fn count_states_and_arcs(&self) -> (usize, usize) {
        let reachable = self.reachable();
        let arcs = reachable.iter().map(|&id| self.state(id).arcs.len()).sum();
        (reachable.len(), arcs)
    }
}
