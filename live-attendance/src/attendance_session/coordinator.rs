use crate::{
    errors::session_error::SessionError,
    models::{
        status::Status,
        transient::active_session::{ActiveSession, SessionHandle, Summary},
    },
    persistence::PersistenceBridge,
};
use futures::future::join_all;
use log::{error, info, warn};
use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};

/// Final status written for one roster student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalRecord {
    pub student_id: i32,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeResult {
    pub class_id: i32,
    /// Counts over explicitly marked students only, not the defaulted roster.
    pub summary: Summary,
    pub records: Vec<FinalRecord>,
    /// Records the bridge accepted. Failed writes are logged and not retried.
    pub persisted: usize,
}

/// Owner of the single active attendance session.
///
/// Every read and mutation goes through one mutex that is never held across
/// an await, so `finalize` leaves the session open to marks while it waits on
/// the persistence bridge.
#[derive(Default)]
pub struct AttendanceSession {
    active: Mutex<Option<ActiveSession>>,
    generation: AtomicU64,
}

impl AttendanceSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<ActiveSession>>, SessionError> {
        self.active.lock().or(Err(SessionError::LockPoisoned))
    }

    pub fn start(&self, class_id: i32) -> Result<SessionHandle, SessionError> {
        let mut active = self.lock()?;
        if active.is_some() {
            return Err(SessionError::Conflict);
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let session = ActiveSession::new(generation, class_id);
        let handle = session.handle();
        *active = Some(session);

        info!("Attendance session started for class {class_id}");
        Ok(handle)
    }

    pub fn session(&self) -> Result<Option<ActiveSession>, SessionError> {
        Ok(self.lock()?.clone())
    }

    pub fn is_active(&self) -> Result<bool, SessionError> {
        Ok(self.lock()?.is_some())
    }

    /// Records a status for a student, replacing any earlier one. Returns
    /// `false` without error when no session is active, so a mark racing a
    /// teardown is dropped instead of failing the caller.
    pub fn mark_attendance(&self, student_id: i32, status: Status) -> Result<bool, SessionError> {
        let mut active = self.lock()?;
        let Some(session) = active.as_mut() else {
            warn!("Ignoring mark for student {student_id}, no active session");
            return Ok(false);
        };

        session.attendance.insert(student_id, status);
        Ok(true)
    }

    /// `Ok(None)` means the student has not been marked yet.
    pub fn student_status(&self, student_id: i32) -> Result<Option<Status>, SessionError> {
        self.lock()?
            .as_ref()
            .map(|session| session.status_of(student_id))
            .ok_or(SessionError::NotFound)
    }

    pub fn summary(&self) -> Result<Summary, SessionError> {
        self.lock()?
            .as_ref()
            .map(ActiveSession::summary)
            .ok_or(SessionError::NotFound)
    }

    pub fn clear_session(&self) -> Result<(), SessionError> {
        if self.lock()?.take().is_some() {
            info!("Attendance session cleared");
        }
        Ok(())
    }

    /// Closes the session: every roster student gets a durable record, with
    /// unmarked students recorded as absent.
    pub async fn finalize(
        &self,
        bridge: &dyn PersistenceBridge,
    ) -> Result<FinalizeResult, SessionError> {
        let (class_id, generation) = {
            let active = self.lock()?;
            let session = active.as_ref().ok_or(SessionError::NotFound)?;
            (session.class_id, session.generation)
        };

        let roster = bridge
            .fetch_roster(class_id)
            .await?
            .ok_or(SessionError::ClassNotFound)?;

        // Marks that landed while the roster was in flight are part of this
        // snapshot. A session cleared or replaced meanwhile writes nothing.
        let (records, marked_summary) = {
            let active = self.lock()?;
            let session = active
                .as_ref()
                .filter(|session| session.generation == generation)
                .ok_or(SessionError::NotFound)?;

            let records: Vec<FinalRecord> = roster
                .student_ids
                .iter()
                .map(|student_id| FinalRecord {
                    student_id: *student_id,
                    status: session.status_of(*student_id).unwrap_or(Status::Absent),
                })
                .collect();

            (records, session.summary())
        };

        let writes = records.iter().map(|record| {
            bridge.write_attendance_record(roster.class_id, record.student_id, record.status)
        });

        let mut persisted = 0;
        for (record, written) in records.iter().zip(join_all(writes).await) {
            match written {
                Ok(()) => persisted += 1,
                Err(error) => error!(
                    "Could not persist attendance for student {} in class {class_id}: {error}",
                    record.student_id
                ),
            }
        }

        let summary = {
            let mut active = self.lock()?;
            match active.take() {
                Some(session) if session.generation == generation => session.summary(),
                other => {
                    *active = other;
                    marked_summary
                }
            }
        };

        info!(
            "Attendance session for class {class_id} finalized, {persisted}/{} records persisted",
            records.len()
        );

        Ok(FinalizeResult {
            class_id,
            summary,
            records,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::persistence_error::PersistenceError,
        models::class::Class,
        persistence::{Roster, memory_bridge::MemoryBridge},
    };
    use async_trait::async_trait;
    use tokio::sync::Notify;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Gate {
        Roster,
        Writes,
    }

    /// Holds one bridge call open until the test releases it.
    struct GatedBridge {
        inner: MemoryBridge,
        gate: Gate,
        entered: Notify,
        release: Notify,
    }

    impl GatedBridge {
        fn new(inner: MemoryBridge, gate: Gate) -> Self {
            GatedBridge {
                inner,
                gate,
                entered: Notify::new(),
                release: Notify::new(),
            }
        }

        async fn hold(&self, gate: Gate) {
            if self.gate == gate {
                self.entered.notify_one();
                self.release.notified().await;
            }
        }
    }

    #[async_trait]
    impl PersistenceBridge for GatedBridge {
        async fn find_class(&self, class_id: i32) -> Result<Option<Class>, PersistenceError> {
            self.inner.find_class(class_id).await
        }

        async fn fetch_roster(&self, class_id: i32) -> Result<Option<Roster>, PersistenceError> {
            self.hold(Gate::Roster).await;
            self.inner.fetch_roster(class_id).await
        }

        async fn write_attendance_record(
            &self,
            class_id: i32,
            student_id: i32,
            status: Status,
        ) -> Result<(), PersistenceError> {
            self.hold(Gate::Writes).await;
            self.inner
                .write_attendance_record(class_id, student_id, status)
                .await
        }
    }

    fn bridge_with_class(student_ids: Vec<i32>) -> MemoryBridge {
        let bridge = MemoryBridge::new();
        bridge.add_class(1, 10, "Chemistry", student_ids).unwrap();
        bridge
    }

    #[test]
    fn second_start_conflicts() {
        let session = AttendanceSession::new();
        session.start(1).unwrap();

        assert!(matches!(session.start(1), Err(SessionError::Conflict)));
        assert!(matches!(session.start(2), Err(SessionError::Conflict)));
    }

    #[test]
    fn start_succeeds_after_clear() {
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.clear_session().unwrap();
        session.clear_session().unwrap();

        let handle = session.start(2).unwrap();
        assert_eq!(handle.class_id, 2);
    }

    #[test]
    fn last_mark_wins() {
        let session = AttendanceSession::new();
        session.start(1).unwrap();

        assert!(session.mark_attendance(5, Status::Present).unwrap());
        assert!(session.mark_attendance(5, Status::Absent).unwrap());

        assert_eq!(session.student_status(5).unwrap(), Some(Status::Absent));
    }

    #[test]
    fn mark_without_session_is_ignored() {
        let session = AttendanceSession::new();

        assert!(!session.mark_attendance(5, Status::Present).unwrap());
        assert!(session.session().unwrap().is_none());
    }

    #[test]
    fn reads_without_session_are_not_found() {
        let session = AttendanceSession::new();

        assert!(matches!(session.summary(), Err(SessionError::NotFound)));
        assert!(matches!(
            session.student_status(1),
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn finalize_defaults_unmarked_students_to_absent() {
        let bridge = bridge_with_class(vec![100, 200, 300]);
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();

        let result = session.finalize(&bridge).await.unwrap();

        let records = bridge.records(1).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[&100], Status::Present);
        assert_eq!(records[&200], Status::Absent);
        assert_eq!(records[&300], Status::Absent);
        assert_eq!(result.persisted, 3);

        // Counts reflect explicit marks, not the roster.
        assert_eq!(
            result.summary,
            Summary {
                present: 1,
                absent: 0,
                total: 1
            }
        );
    }

    #[tokio::test]
    async fn finalize_clears_session() {
        let bridge = bridge_with_class(vec![100]);
        let session = AttendanceSession::new();
        session.start(1).unwrap();

        session.finalize(&bridge).await.unwrap();

        assert!(session.session().unwrap().is_none());
        assert!(session.start(1).is_ok());
    }

    #[tokio::test]
    async fn finalize_without_session_is_not_found() {
        let bridge = bridge_with_class(vec![100]);
        let session = AttendanceSession::new();

        assert!(matches!(
            session.finalize(&bridge).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn finalize_for_missing_class_keeps_session() {
        let bridge = MemoryBridge::new();
        let session = AttendanceSession::new();
        session.start(99).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();

        assert!(matches!(
            session.finalize(&bridge).await,
            Err(SessionError::ClassNotFound)
        ));
        assert_eq!(session.student_status(100).unwrap(), Some(Status::Present));
    }

    #[tokio::test]
    async fn failed_writes_still_report_success() {
        let bridge = bridge_with_class(vec![100, 200]);
        bridge.fail_writes_for(200).unwrap();
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.mark_attendance(200, Status::Present).unwrap();

        let result = session.finalize(&bridge).await.unwrap();

        // Partial persistence is tolerated: no error, one record missing.
        assert_eq!(result.persisted, 1);
        assert_eq!(result.records.len(), 2);
        assert!(!bridge.records(1).unwrap().contains_key(&200));
        assert!(session.session().unwrap().is_none());
    }

    #[tokio::test]
    async fn refinalizing_a_class_persists_nothing_new() {
        let bridge = bridge_with_class(vec![100]);
        let session = AttendanceSession::new();

        session.start(1).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();
        session.finalize(&bridge).await.unwrap();

        session.start(1).unwrap();
        session.mark_attendance(100, Status::Absent).unwrap();
        let result = session.finalize(&bridge).await.unwrap();

        assert_eq!(result.persisted, 0);
        assert_eq!(bridge.records(1).unwrap()[&100], Status::Present);
    }

    #[tokio::test]
    async fn marks_during_roster_fetch_are_persisted() {
        let bridge = GatedBridge::new(bridge_with_class(vec![100, 200, 300]), Gate::Roster);
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();

        let (result, ()) = tokio::join!(session.finalize(&bridge), async {
            bridge.entered.notified().await;
            session.mark_attendance(200, Status::Present).unwrap();
            bridge.release.notify_one();
        });
        let result = result.unwrap();

        let records = bridge.inner.records(1).unwrap();
        assert_eq!(records[&100], Status::Present);
        assert_eq!(records[&200], Status::Present);
        assert_eq!(records[&300], Status::Absent);
        assert_eq!(
            result.summary,
            Summary {
                present: 2,
                absent: 0,
                total: 2
            }
        );
        assert!(session.session().unwrap().is_none());
    }

    #[tokio::test]
    async fn session_cleared_during_roster_fetch_writes_nothing() {
        let bridge = GatedBridge::new(bridge_with_class(vec![100, 200]), Gate::Roster);
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();

        let (result, ()) = tokio::join!(session.finalize(&bridge), async {
            bridge.entered.notified().await;
            session.clear_session().unwrap();
            session.start(2).unwrap();
            bridge.release.notify_one();
        });

        assert!(matches!(result, Err(SessionError::NotFound)));
        assert!(bridge.inner.records(1).unwrap().is_empty());
        assert_eq!(session.session().unwrap().unwrap().class_id, 2);
    }

    #[tokio::test]
    async fn session_started_during_writes_survives_finalize() {
        let bridge = GatedBridge::new(bridge_with_class(vec![100]), Gate::Writes);
        let session = AttendanceSession::new();
        session.start(1).unwrap();
        session.mark_attendance(100, Status::Present).unwrap();

        let (result, ()) = tokio::join!(session.finalize(&bridge), async {
            bridge.entered.notified().await;
            session.clear_session().unwrap();
            session.start(2).unwrap();
            session.mark_attendance(100, Status::Absent).unwrap();
            bridge.release.notify_one();
        });
        let result = result.unwrap();

        assert_eq!(result.persisted, 1);
        assert_eq!(bridge.inner.records(1).unwrap()[&100], Status::Present);

        let survivor = session.session().unwrap().unwrap();
        assert_eq!(survivor.class_id, 2);
        assert_eq!(survivor.status_of(100), Some(Status::Absent));
    }
}
