/// SQLSTATE raised by Postgres when an insert or update violates a unique constraint.
const UNIQUE_VIOLATION: &str = "23505";

/// Returns `true` if `err` was raised by a unique constraint, such as the one on pod names.
pub fn is_unique_constraint_violation_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
