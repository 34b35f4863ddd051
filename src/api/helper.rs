use crate::errors::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::log::{debug, error, warn};

/// Runs a diesel closure on a pooled connection, mapping pool, interact
/// and query errors into `AppError`.
pub(super) async fn run_query<T, F>(
    pool: &deadpool_diesel::postgres::Pool,
    query: F,
) -> Result<T, AppError>
where
    F: FnOnce(&mut diesel::PgConnection) -> Result<T, diesel::result::Error> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await.map_err(|pool_err| {
        error!(
            "Failed to get DB connection object from pool: {:?}",
            pool_err
        );
        AppError::from(pool_err)
    })?;
    debug!("DB connection object obtained from pool for interaction");

    let res = conn.interact(query).await;

    match res {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(diesel_err)) => {
            error!("Diesel query failed within interaction: {:?}", diesel_err);
            Err(AppError::from(diesel_err))
        }
        Err(interact_err) => {
            error!("Deadpool interact error: {:?}", interact_err);
            Err(AppError::from(interact_err))
        }
    }
}

/// Runs a read whose failure degrades the view instead of the request:
/// errors are logged and the default value is returned. Used for the
/// overlay reads (progress rows, earned badges, attempt lists) that
/// decorate a primary result.
pub(super) async fn run_query_or_default<T, F>(
    pool: &deadpool_diesel::postgres::Pool,
    query: F,
) -> T
where
    F: FnOnce(&mut diesel::PgConnection) -> Result<T, diesel::result::Error> + Send + 'static,
    T: Default + Send + 'static,
{
    match run_query(pool, query).await {
        Ok(result) => result,
        Err(err) => {
            error!("Degrading failed overlay read to default: {}", err);
            T::default()
        }
    }
}

/// Rewrites a foreign-key violation into a 404 with a domain message;
/// any other error passes through untouched.
pub(super) fn fk_violation_to_not_found(err: AppError, message: impl Into<String>) -> AppError {
    if let AppError::InternalServerError(source) = &err {
        if let Some(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info)) =
            source.downcast_ref::<DieselError>()
        {
            warn!("Foreign key violation: {}", info.message());
            return AppError::NotFound(message.into());
        }
    }
    err
}

/// Rewrites a unique-constraint violation into a 409 with a domain
/// message; any other error passes through untouched.
pub(super) fn unique_violation_to_conflict(err: AppError, message: impl Into<String>) -> AppError {
    if let AppError::InternalServerError(source) = &err {
        if let Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) =
            source.downcast_ref::<DieselError>()
        {
            warn!("Unique constraint violation: {}", info.message());
            return AppError::Conflict(message.into());
        }
    }
    err
}
