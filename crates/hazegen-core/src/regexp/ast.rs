//! Regexp IR over a closed set of shapes.

use crate::ids::{ReservId, UnitId};

/// A reservation regexp node.
///
/// The parser produces `Name` leaves; the checker resolves them to `Unit` or
/// `Reserv`. After canonicalization `Name`, `Reserv`, and `Repeat` are gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regexp {
    /// Unresolved name, straight from the parser.
    Name(String),
    /// A functional unit reserved for one cycle.
    Unit(UnitId),
    /// A reference to a named reservation, inlined before transformation.
    Reserv(ReservId),
    /// One cycle reserving nothing.
    Nothing,
    /// Consecutive cycles.
    Sequence(Vec<Regexp>),
    /// `child * n`: n consecutive copies of child.
    Repeat(Box<Regexp>, u32),
    /// Same-cycle parallel reservation.
    AllOf(Vec<Regexp>),
    /// Alternative reservations.
    OneOf(Vec<Regexp>),
}

impl Regexp {
    /// Render with explicit grouping, for dumps and test assertions.
    pub fn display(&self, unit_names: &[String], reserv_names: &[String]) -> String {
        match self {
            Regexp::Name(name) => name.clone(),
            Regexp::Unit(u) => unit_names[u.index()].clone(),
            Regexp::Reserv(r) => reserv_names[r.index()].clone(),
            Regexp::Nothing => "nothing".to_string(),
            Regexp::Sequence(children) => Self::join(children, ", ", unit_names, reserv_names),
            Regexp::Repeat(child, n) => {
                format!("{}*{}", child.display(unit_names, reserv_names), n)
            }
            Regexp::AllOf(children) => Self::join(children, "+", unit_names, reserv_names),
            Regexp::OneOf(children) => Self::join(children, "|", unit_names, reserv_names),
        }
    }

    fn join(children: &[Regexp], sep: &str, units: &[String], reservs: &[String]) -> String {
        let parts: Vec<String> = children
            .iter()
            .map(|c| match c {
                Regexp::Sequence(_) | Regexp::AllOf(_) | Regexp::OneOf(_) => {
                    format!("({})", c.display(units, reservs))
                }
                _ => c.display(units, reservs),
            })
            .collect();
        parts.join(sep)
    }

    /// Visit every node, outermost first.
    pub fn walk(&self, f: &mut impl FnMut(&Regexp)) {
        f(self);
        match self {
            Regexp::Sequence(children) | Regexp::AllOf(children) | Regexp::OneOf(children) => {
                for child in children {
                    child.walk(f);
                }
            }
            Regexp::Repeat(child, _) => child.walk(f),
            _ => {}
        }
    }
}
