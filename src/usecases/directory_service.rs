//! Directory service. Shares one `WorkGroupDirectory` behind an async lock and
//! writes the snapshot after every successful mutation.
//!
//! - Loads the stored snapshot, or stores the seed dataset on first run
//! - Refused mutations (`MembershipError`) change nothing and write nothing
//! - A mutation whose snapshot write fails is rolled back before the error is returned

use crate::domain::{
    AiAgent, AiConversation, DirectorySnapshot, DomainError, ExamSession, HomeworkSession,
    MemberPermissions, MembershipError, NewWorkGroup, StudentProfile, WorkGroup,
    WorkGroupInvitation, WorkGroupMember,
};
use crate::ports::{Clock, SnapshotPort};
use crate::usecases::work_group_directory::{DirectoryPolicy, WorkGroupDirectory};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

struct ServiceState {
    directory: WorkGroupDirectory,
    /// Records the directory does not own (students, agents, sessions, conversations).
    records: DirectorySnapshot,
}

impl ServiceState {
    fn snapshot(&self) -> DirectorySnapshot {
        let mut snap = self.records.clone();
        self.directory.export_into(&mut snap);
        snap
    }
}

/// Assistant-facing view of the dataset for one student.
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub agents: Vec<AiAgent>,
    pub exams: Vec<ExamSession>,
    pub homeworks: Vec<HomeworkSession>,
}

pub struct DirectoryService {
    state: RwLock<ServiceState>,
    store: Arc<dyn SnapshotPort>,
}

impl DirectoryService {
    /// Open the stored snapshot, or persist `seed` when the store is empty.
    pub async fn open(
        store: Arc<dyn SnapshotPort>,
        policy: DirectoryPolicy,
        clock: Arc<dyn Clock>,
        seed: DirectorySnapshot,
    ) -> Result<Self, DomainError> {
        let (records, seeded) = match store.load().await? {
            Some(snap) => (snap, false),
            None => (seed, true),
        };
        let directory = WorkGroupDirectory::from_snapshot(&records, policy, clock);
        let service = Self {
            state: RwLock::new(ServiceState { directory, records }),
            store,
        };
        if seeded {
            info!("no stored snapshot, writing seed dataset");
            service.persist(&*service.state.read().await).await?;
        }
        Ok(service)
    }

    /// Run a read-only query against the directory.
    pub async fn read<R>(&self, f: impl FnOnce(&WorkGroupDirectory) -> R) -> R {
        let state = self.state.read().await;
        f(&state.directory)
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn students(&self) -> Vec<StudentProfile> {
        self.state.read().await.records.students.clone()
    }

    pub async fn student(&self, student_id: &str) -> Option<StudentProfile> {
        self.state.read().await.records.student(student_id).cloned()
    }

    pub async fn create_group(
        &self,
        data: NewWorkGroup,
        creator_id: &str,
    ) -> Result<WorkGroup, DomainError> {
        self.mutate(|d| d.try_create_group(data, creator_id)).await
    }

    pub async fn join_group(
        &self,
        group_id: &str,
        student_id: &str,
    ) -> Result<WorkGroupMember, DomainError> {
        self.mutate(|d| d.try_join_group(group_id, student_id)).await
    }

    pub async fn leave_group(&self, group_id: &str, student_id: &str) -> Result<(), DomainError> {
        self.mutate(|d| d.try_leave_group(group_id, student_id)).await
    }

    pub async fn invite(
        &self,
        group_id: &str,
        inviter_id: &str,
        invitee_id: &str,
        message: Option<String>,
    ) -> Result<WorkGroupInvitation, DomainError> {
        self.mutate(|d| d.invite(group_id, inviter_id, invitee_id, message))
            .await
    }

    /// Accept an invitation. An expired invitation is marked `Expired` and that
    /// status change is persisted even though the call fails.
    pub async fn accept_invitation(
        &self,
        invitation_id: &str,
        student_id: &str,
    ) -> Result<WorkGroupMember, DomainError> {
        self.mutate(|d| d.accept_invitation(invitation_id, student_id))
            .await
    }

    pub async fn decline_invitation(
        &self,
        invitation_id: &str,
        student_id: &str,
    ) -> Result<(), DomainError> {
        self.mutate(|d| d.decline_invitation(invitation_id, student_id))
            .await
    }

    pub async fn update_permissions(
        &self,
        group_id: &str,
        actor_id: &str,
        target_id: &str,
        permissions: MemberPermissions,
    ) -> Result<(), DomainError> {
        self.mutate(|d| d.update_permissions(group_id, actor_id, target_id, permissions))
            .await
    }

    /// Sweep expired invitations; writes only when something changed.
    pub async fn expire_invitations(&self) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;
        let before = state.directory.clone();
        let expired = state.directory.expire_invitations();
        if expired > 0 {
            if let Err(e) = self.persist(&state).await {
                state.directory = before;
                return Err(e);
            }
        }
        Ok(expired)
    }

    pub async fn assistant_context(&self) -> AssistantContext {
        let state = self.state.read().await;
        AssistantContext {
            agents: state.records.agents.clone(),
            exams: state.records.exam_sessions.clone(),
            homeworks: state.records.homework_sessions.clone(),
        }
    }

    pub async fn conversations_for(&self, student_id: &str) -> Vec<AiConversation> {
        self.state
            .read()
            .await
            .records
            .conversations
            .iter()
            .filter(|c| c.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Insert or replace a conversation by id.
    pub async fn save_conversation(&self, conversation: AiConversation) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let before = state.records.conversations.clone();
        let conversations = &mut state.records.conversations;
        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => conversations.push(conversation),
        }
        if let Err(e) = self.persist(&state).await {
            state.records.conversations = before;
            return Err(e);
        }
        Ok(())
    }

    /// Apply `f` and persist. `Expired` refusals still persist the status flip.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut WorkGroupDirectory) -> Result<T, MembershipError>,
    ) -> Result<T, DomainError> {
        let mut state = self.state.write().await;
        let before = state.directory.clone();
        let out = f(&mut state.directory);
        if matches!(out, Ok(_) | Err(MembershipError::Expired(_))) {
            if let Err(e) = self.persist(&state).await {
                state.directory = before;
                return Err(e);
            }
        }
        out.map_err(DomainError::from)
    }

    async fn persist(&self, state: &ServiceState) -> Result<(), DomainError> {
        let snap = state.snapshot();
        if let Err(e) = self.store.save(&snap).await {
            warn!(error = %e, "snapshot write failed; in-memory state is ahead of storage");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use crate::ports::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    /// Keeps the last saved snapshot in memory. Saves fail while `failing` is set.
    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<DirectorySnapshot>>,
        saves: Mutex<usize>,
        failing: Mutex<bool>,
    }

    impl MemoryStore {
        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        fn saves(&self) -> usize {
            *self.saves.lock().unwrap()
        }

        fn last(&self) -> DirectorySnapshot {
            self.saved.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl SnapshotPort for MemoryStore {
        async fn load(&self) -> Result<Option<DirectorySnapshot>, DomainError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, snapshot: &DirectorySnapshot) -> Result<(), DomainError> {
            if *self.failing.lock().unwrap() {
                return Err(DomainError::Store("disk full".into()));
            }
            *self.saved.lock().unwrap() = Some(snapshot.clone());
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
    }

    async fn open(store: Arc<MemoryStore>, clock: Arc<FixedClock>) -> DirectoryService {
        DirectoryService::open(store, DirectoryPolicy::default(), clock, seed_snapshot(t0()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_empty_store() {
        let store = Arc::new(MemoryStore::default());
        let service = open(store.clone(), Arc::new(FixedClock::new(t0()))).await;
        assert_eq!(store.saves(), 1);
        assert_eq!(store.last().groups.len(), 4);
        assert_eq!(service.students().await.len(), 9);
    }

    #[tokio::test]
    async fn test_mutation_persists_and_refusal_does_not() {
        let store = Arc::new(MemoryStore::default());
        let service = open(store.clone(), Arc::new(FixedClock::new(t0()))).await;

        service.join_group("wg-1", "student-99").await.unwrap();
        assert_eq!(store.saves(), 2);
        assert_eq!(store.last().groups[0].current_members, 5);

        let err = service.join_group("wg-1", "student-99").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Membership(MembershipError::AlreadyMember { .. })
        ));
        let err = service.leave_group("wg-1", "student-1").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Membership(MembershipError::NotPermitted(_))
        ));
        assert_eq!(store.saves(), 2);
        assert_eq!(service.read(|d| d.group("wg-1").unwrap().current_members).await, 5);
    }

    #[tokio::test]
    async fn test_reopen_uses_stored_state() {
        let store = Arc::new(MemoryStore::default());
        let clock = Arc::new(FixedClock::new(t0()));
        {
            let service = open(store.clone(), clock.clone()).await;
            service.leave_group("wg-1", "student-4").await.unwrap();
        }
        let service = open(store.clone(), clock).await;
        assert_eq!(service.read(|d| d.group("wg-1").unwrap().current_members).await, 3);
    }

    #[tokio::test]
    async fn test_expired_accept_is_persisted_as_expired() {
        let store = Arc::new(MemoryStore::default());
        let clock = Arc::new(FixedClock::new(t0()));
        let service = open(store.clone(), clock.clone()).await;

        clock.advance(Duration::days(7));
        let err = service.accept_invitation("inv-1", "student-5").await.unwrap_err();
        assert!(matches!(err, DomainError::Membership(MembershipError::Expired(_))));

        let saved = store.last();
        let inv = saved.invitations.iter().find(|i| i.id == "inv-1").unwrap();
        assert_eq!(inv.status, crate::domain::InvitationStatus::Expired);
        assert!(saved.members.iter().all(|m| m.student_id != "student-5" || m.group_id != "wg-1"));
    }

    #[tokio::test]
    async fn test_save_conversation_upserts() {
        let store = Arc::new(MemoryStore::default());
        let service = open(store.clone(), Arc::new(FixedClock::new(t0()))).await;

        let mut conv = AiConversation::new("conv-1", "agent-math", "student-4", None, t0());
        service.save_conversation(conv.clone()).await.unwrap();
        conv.push(crate::domain::ChatRole::Student, "hello", t0());
        service.save_conversation(conv).await.unwrap();

        let convs = service.conversations_for("student-4").await;
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].messages.len(), 1);
        assert_eq!(store.last().conversations.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_join() {
        let store = Arc::new(MemoryStore::default());
        let service = open(store.clone(), Arc::new(FixedClock::new(t0()))).await;

        store.set_failing(true);
        let err = service.join_group("wg-1", "student-99").await.unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
        assert_eq!(service.read(|d| d.group("wg-1").unwrap().current_members).await, 4);
        assert!(service.read(|d| d.membership("wg-1", "student-99").is_none()).await);

        store.set_failing(false);
        service.join_group("wg-1", "student-99").await.unwrap();
        assert_eq!(store.last().groups[0].current_members, 5);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_sweep_and_conversation() {
        let store = Arc::new(MemoryStore::default());
        let service = open(store.clone(), Arc::new(FixedClock::new(t0()))).await;

        store.set_failing(true);
        assert!(service.expire_invitations().await.is_err());
        let status = service.read(|d| d.invitation("inv-2").unwrap().status).await;
        assert_eq!(status, crate::domain::InvitationStatus::Pending);

        let conv = AiConversation::new("conv-1", "agent-math", "student-4", None, t0());
        assert!(service.save_conversation(conv).await.is_err());
        assert!(service.conversations_for("student-4").await.is_empty());

        store.set_failing(false);
        assert_eq!(service.expire_invitations().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_decline_is_persisted_as_expired() {
        let store = Arc::new(MemoryStore::default());
        let clock = Arc::new(FixedClock::new(t0()));
        let service = open(store.clone(), clock.clone()).await;

        clock.advance(Duration::days(7));
        let err = service.decline_invitation("inv-1", "student-5").await.unwrap_err();
        assert!(matches!(err, DomainError::Membership(MembershipError::Expired(_))));
        let saved = store.last();
        let inv = saved.invitations.iter().find(|i| i.id == "inv-1").unwrap();
        assert_eq!(inv.status, crate::domain::InvitationStatus::Expired);
    }
}
