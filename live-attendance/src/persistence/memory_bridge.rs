use super::{PersistenceBridge, Roster};
use crate::{
    errors::persistence_error::PersistenceError,
    models::{class::Class, status::Status},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-process bridge with the same uniqueness rules as the database.
#[derive(Default)]
pub struct MemoryBridge {
    classes: Mutex<HashMap<i32, (Class, Vec<i32>)>>,
    records: Mutex<HashMap<(i32, i32), Status>>,
    failing_students: Mutex<HashSet<i32>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(
        &self,
        class_id: i32,
        teacher_id: i32,
        class_name: &str,
        student_ids: Vec<i32>,
    ) -> Result<(), PersistenceError> {
        let class = Class {
            id: class_id,
            class_name: class_name.to_string(),
            teacher_id,
        };

        self.classes
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?
            .insert(class_id, (class, student_ids));

        Ok(())
    }

    /// Makes every write for `student_id` fail, to exercise partial persistence.
    pub fn fail_writes_for(&self, student_id: i32) -> Result<(), PersistenceError> {
        self.failing_students
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?
            .insert(student_id);

        Ok(())
    }

    pub fn records(&self, class_id: i32) -> Result<HashMap<i32, Status>, PersistenceError> {
        Ok(self
            .records
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?
            .iter()
            .filter(|((record_class_id, _), _)| *record_class_id == class_id)
            .map(|((_, student_id), status)| (*student_id, *status))
            .collect())
    }
}

#[async_trait]
impl PersistenceBridge for MemoryBridge {
    async fn find_class(&self, class_id: i32) -> Result<Option<Class>, PersistenceError> {
        let classes = self
            .classes
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?;

        Ok(classes.get(&class_id).map(|(class, _)| class.clone()))
    }

    async fn fetch_roster(&self, class_id: i32) -> Result<Option<Roster>, PersistenceError> {
        let classes = self
            .classes
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?;

        Ok(classes.get(&class_id).map(|(_, student_ids)| Roster {
            class_id,
            student_ids: student_ids.clone(),
        }))
    }

    async fn write_attendance_record(
        &self,
        class_id: i32,
        student_id: i32,
        status: Status,
    ) -> Result<(), PersistenceError> {
        if self
            .failing_students
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?
            .contains(&student_id)
        {
            return Err(PersistenceError::Pool(format!(
                "write for student {student_id} rejected"
            )));
        }

        let mut records = self
            .records
            .lock()
            .or(Err(PersistenceError::LockPoisoned))?;

        if records.contains_key(&(class_id, student_id)) {
            return Err(PersistenceError::Duplicate {
                class_id,
                student_id,
            });
        }

        records.insert((class_id, student_id), status);
        Ok(())
    }
}
