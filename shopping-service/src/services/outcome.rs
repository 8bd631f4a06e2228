//! Result of an upstream step that may have fallen back to canned content.

/// Content produced by an upstream step.
///
/// Hard failures are reported through `Result`; this type only separates
/// genuine provider output from fallback substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The provider produced the content.
    Generated(T),
    /// Fallback content, with the reason the provider output was not used.
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Generated(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Generated(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Generated(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Generated(_) => "generated",
            Outcome::Degraded { .. } => "degraded",
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Generated(value) => Outcome::Generated(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let generated = Outcome::Generated(3);
        assert!(!generated.is_degraded());
        assert_eq!(generated.reason(), None);
        assert_eq!(generated.label(), "generated");

        let degraded = Outcome::degraded(4, "timeout").map(|v| v * 2);
        assert!(degraded.is_degraded());
        assert_eq!(*degraded.value(), 8);
        assert_eq!(degraded.reason(), Some("timeout"));
        assert_eq!(degraded.into_value(), 8);
    }
}
