//! # Typed first-order literals
//!
//! The representation shared by the rule learner: [`Term`]s with a declared
//! kind and a role, signed [`Literal`]s over ordered term lists, and
//! [`Clause`]s pairing precondition literals with effect literals.
//!
//! ## Generality
//!
//! Literal generality is a partial order defined only between compatible
//! literals (same polarity and name). A variable is more general than any
//! constant or parameter of its kind; constants and parameters are only
//! comparable to an equal term of the same role.

pub mod clause;
pub mod literal;
pub mod term;

pub use clause::Clause;
pub use literal::Literal;
pub use term::{Generality, Role, Term};
