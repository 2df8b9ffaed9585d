use crate::error::CoreError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The rule that decides whether a resolution is a slug's first visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FirstVisitPolicy {
    /// One flag per slug, read and written as two separate operations.
    ///
    /// Two concurrent first resolutions can both observe the flag unset and
    /// both receive the first URL. This is a known defect of the policy and
    /// is kept for comparison with [`FirstVisitPolicy::AtomicGlobal`].
    Global,
    /// One flag per slug, flipped with a compare-and-swap in the store.
    /// At most one resolution ever receives the first URL.
    AtomicGlobal,
    /// One ledger entry per (slug, visitor) pair, inserted under a
    /// uniqueness constraint. Each visitor receives the first URL once.
    #[default]
    PerVisitor,
}

impl FirstVisitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstVisitPolicy::Global => "global",
            FirstVisitPolicy::AtomicGlobal => "atomic-global",
            FirstVisitPolicy::PerVisitor => "per-visitor",
        }
    }
}

impl Display for FirstVisitPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FirstVisitPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(FirstVisitPolicy::Global),
            "atomic-global" => Ok(FirstVisitPolicy::AtomicGlobal),
            "per-visitor" => Ok(FirstVisitPolicy::PerVisitor),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}
