use super::{PersistenceBridge, Roster};
use crate::{
    errors::persistence_error::PersistenceError,
    models::{class::Class, status::Status},
    schema::{attendances, class_students, classes},
};
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    ExpressionMethods, MysqlConnection, OptionalExtension, QueryDsl, RunQueryDsl,
    SelectableHelper,
    dsl::insert_into,
    r2d2::{ConnectionManager, Pool},
    result::{DatabaseErrorKind, Error as DieselError},
};

pub type DbPool = Pool<ConnectionManager<MysqlConnection>>;

pub struct MysqlBridge {
    pool: DbPool,
}

impl MysqlBridge {
    pub fn new(pool: DbPool) -> Self {
        MysqlBridge { pool }
    }

    /// Runs a query on a pooled connection without blocking the runtime.
    async fn run<T, F>(&self, query: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut MysqlConnection) -> Result<T, PersistenceError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|error| PersistenceError::Pool(error.to_string()))?;
            query(&mut *connection)
        })
        .await?
    }
}

fn find_class(
    connection: &mut MysqlConnection,
    class_id: i32,
) -> Result<Option<Class>, PersistenceError> {
    Ok(classes::table
        .find(class_id)
        .select(Class::as_select())
        .first(connection)
        .optional()?)
}

#[async_trait]
impl PersistenceBridge for MysqlBridge {
    async fn find_class(&self, class_id: i32) -> Result<Option<Class>, PersistenceError> {
        self.run(move |connection| find_class(connection, class_id))
            .await
    }

    async fn fetch_roster(&self, class_id: i32) -> Result<Option<Roster>, PersistenceError> {
        self.run(move |connection| {
            if find_class(connection, class_id)?.is_none() {
                return Ok(None);
            }

            let student_ids = class_students::table
                .filter(class_students::class_id.eq(class_id))
                .select(class_students::student_id)
                .load::<i32>(connection)?;

            Ok(Some(Roster {
                class_id,
                student_ids,
            }))
        })
        .await
    }

    async fn write_attendance_record(
        &self,
        class_id: i32,
        student_id: i32,
        status: Status,
    ) -> Result<(), PersistenceError> {
        self.run(move |connection| {
            let inserted = insert_into(attendances::table)
                .values((
                    attendances::class_id.eq(class_id),
                    attendances::student_id.eq(student_id),
                    attendances::status.eq(status.as_str()),
                    attendances::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(connection);

            match inserted {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(PersistenceError::Duplicate {
                        class_id,
                        student_id,
                    })
                }
                Err(error) => Err(error.into()),
            }
        })
        .await
    }
}
