//! Data access over the MySQL pool. Row structs stay private to these
//! modules; embedded documents (breaks, penalties, snapshots, allowance and
//! deduction maps) live in JSON text columns.

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod location;
pub mod payroll;
pub mod policy;
pub mod schedule;

use crate::error::DomainError;

/// Corrupt stored data surfaces as an infrastructure failure, not a 400.
pub(crate) fn decode_err<E>(e: E) -> DomainError
where
    E: std::error::Error + Send + Sync + 'static,
{
    DomainError::Infrastructure(sqlx::Error::Decode(Box::new(e)))
}
