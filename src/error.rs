use thiserror::Error;

/// Errors produced at the API boundary of a `crn` operation.
///
/// Schema-match failure during enumeration is *not* represented here: it is
/// a local negative result (a candidate tuple is skipped), not a crate-level
/// error. Stochastic exhaustion is likewise not an error; see
/// [`crate::result::StoResult::exhausted`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Wrong key type, negative concentration/count, a reserved name used
    /// illegally, both `t` and `steps` given to the stochastic simulator,
    /// or a non-positive end time.
    #[error("input error: {0}")]
    Input(String),

    /// A schema species with unbound groups was used where a concrete
    /// species is required, or a tuple of reactants captured the same
    /// group name with conflicting values.
    #[error("schema error: {0}")]
    Schema(String),

    /// The ODE backend failed to integrate, or a propensity evaluated to
    /// a non-finite value.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// The text-format CRN description could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}
