use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use shared::{
    domain::{FieldName, UserId},
    protocol::{UserFields, UserRecord},
};
use tokio::{
    sync::{broadcast, watch},
    task::{self, JoinError, JoinSet},
};
use tracing::{debug, error, info, warn};

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Operation},
    draft::DraftState,
    error::{ControllerError, Intent},
    policy::{ReconcilePolicy, SyncPolicy},
    remote::UsersRemote,
};

const DIAGNOSTIC_CAPACITY: usize = 64;

/// What the renderer sees: the collection and the open draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<UserRecord>,
    pub draft: DraftState,
}

/// Result of a remote call that was fired without being awaited.
enum Completion {
    Update {
        id: UserId,
        result: anyhow::Result<()>,
    },
    Create {
        seq: u64,
        result: anyhow::Result<UserRecord>,
    },
    Delete {
        id: UserId,
        result: anyhow::Result<()>,
    },
}

/// Owns the local user collection and the single open draft, and keeps them
/// in step with a [`UsersRemote`].
///
/// Calls fired under [`ReconcilePolicy::Optimistic`] run in the background.
/// Their completions are applied at the start of the next intent or by
/// [`CollectionController::settle`]. Background creates are appended in the
/// order they were issued, whatever order they finish in. Dropping the
/// controller aborts calls that are still outstanding, so call `settle` first
/// when they must land.
pub struct CollectionController {
    remote: Arc<dyn UsersRemote>,
    policy: SyncPolicy,
    records: Vec<UserRecord>,
    draft: DraftState,
    initialized: bool,
    in_flight: JoinSet<Completion>,
    create_tasks: HashMap<task::Id, u64>,
    held_creates: BTreeMap<u64, anyhow::Result<UserRecord>>,
    issued_creates: u64,
    next_create: u64,
    state: watch::Sender<Snapshot>,
    diagnostics: broadcast::Sender<Diagnostic>,
}

impl CollectionController {
    pub fn new(remote: Arc<dyn UsersRemote>) -> Self {
        Self::with_policy(remote, SyncPolicy::default())
    }

    pub fn with_policy(remote: Arc<dyn UsersRemote>, policy: SyncPolicy) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        let (diagnostics, _) = broadcast::channel(DIAGNOSTIC_CAPACITY);
        Self {
            remote,
            policy,
            records: Vec::new(),
            draft: DraftState::Idle,
            initialized: false,
            in_flight: JoinSet::new(),
            create_tasks: HashMap::new(),
            held_creates: BTreeMap::new(),
            issued_creates: 0,
            next_create: 0,
            state,
            diagnostics,
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.records.clone(),
            draft: self.draft.clone(),
        }
    }

    /// Number of background calls not yet applied.
    pub fn pending_calls(&self) -> usize {
        self.in_flight.len() + self.held_creates.len()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn subscribe_diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    /// Loads the full collection. May be called once per controller.
    pub async fn initialize(&mut self) -> Result<(), ControllerError> {
        if self.initialized {
            return Err(ControllerError::precondition(
                Intent::Initialize,
                "collection has already been loaded",
            ));
        }
        self.initialized = true;

        match self.remote.list().await {
            Ok(users) => {
                self.records.clear();
                for user in users {
                    self.upsert(user);
                }
                info!(count = self.records.len(), "loaded users");
                self.report(DiagnosticKind::Loaded {
                    count: self.records.len(),
                });
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "unable to load users");
                self.records.clear();
                self.report(DiagnosticKind::LoadFailed { message });
            }
        }

        self.publish();
        Ok(())
    }

    pub fn start_edit(&mut self, id: UserId) -> Result<(), ControllerError> {
        self.reap_completed();
        let Some(record) = self.records.iter().find(|record| record.id == id) else {
            return Err(ControllerError::precondition(
                Intent::StartEdit,
                format!("user {id} is not in the collection"),
            ));
        };
        let next = DraftState::EditingExisting {
            target: id,
            fields: record.fields(),
        };
        self.replace_draft(next);
        debug!(user_id = id.0, "editing user");
        self.publish();
        Ok(())
    }

    pub fn change_field(
        &mut self,
        field: FieldName,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        self.reap_completed();
        let Some(fields) = self.draft.fields_mut() else {
            return Err(ControllerError::precondition(
                Intent::ChangeField,
                "no draft is open",
            ));
        };
        fields.set(field, value);
        self.publish();
        Ok(())
    }

    pub async fn save_edit(&mut self) -> Result<(), ControllerError> {
        self.reap_completed();
        let DraftState::EditingExisting { target, fields } = &self.draft else {
            return Err(ControllerError::precondition(
                Intent::SaveEdit,
                format!("expected an edit draft, found {}", self.draft.label()),
            ));
        };
        let (id, fields) = (*target, fields.clone());

        match self.policy.update {
            ReconcilePolicy::Optimistic => {
                let remote = Arc::clone(&self.remote);
                let payload = fields.clone();
                self.in_flight.spawn(async move {
                    let result = remote.update(id, &payload).await;
                    Completion::Update { id, result }
                });
            }
            ReconcilePolicy::Confirmed => {
                if let Err(source) = self.remote.update(id, &fields).await {
                    self.report_failure(Operation::Update, Some(id), &source);
                    return Err(ControllerError::NetworkFailure {
                        operation: Operation::Update,
                        source,
                    });
                }
                self.report_success(Operation::Update, Some(id));
            }
        }

        self.merge(id, &fields);
        self.draft = DraftState::Idle;
        self.publish();
        Ok(())
    }

    /// Opens an empty new user draft, discarding whatever draft was open.
    pub fn start_add(&mut self) {
        self.reap_completed();
        self.replace_draft(DraftState::adding());
        self.publish();
    }

    pub async fn save_add(&mut self) -> Result<(), ControllerError> {
        self.reap_completed();
        let DraftState::AddingNew { fields } = &self.draft else {
            return Err(ControllerError::precondition(
                Intent::SaveAdd,
                format!("expected a new user draft, found {}", self.draft.label()),
            ));
        };
        let fields = fields.clone();

        match self.policy.create {
            ReconcilePolicy::Optimistic => {
                let remote = Arc::clone(&self.remote);
                let seq = self.issued_creates;
                self.issued_creates += 1;
                let handle = self.in_flight.spawn(async move {
                    let result = remote.create(&fields).await;
                    Completion::Create { seq, result }
                });
                self.create_tasks.insert(handle.id(), seq);
            }
            ReconcilePolicy::Confirmed => match self.remote.create(&fields).await {
                Ok(created) => {
                    info!(user_id = created.id.0, "created user");
                    self.report_success(Operation::Create, Some(created.id));
                    self.upsert(created);
                }
                Err(source) => {
                    self.report_failure(Operation::Create, None, &source);
                    return Err(ControllerError::NetworkFailure {
                        operation: Operation::Create,
                        source,
                    });
                }
            },
        }

        self.draft = DraftState::Idle;
        self.publish();
        Ok(())
    }

    pub fn cancel_add(&mut self) -> Result<(), ControllerError> {
        self.reap_completed();
        if !matches!(self.draft, DraftState::AddingNew { .. }) {
            return Err(ControllerError::precondition(
                Intent::CancelAdd,
                format!("expected a new user draft, found {}", self.draft.label()),
            ));
        }
        self.draft = DraftState::Idle;
        self.publish();
        Ok(())
    }

    pub async fn delete(&mut self, id: UserId) -> Result<(), ControllerError> {
        self.reap_completed();
        if !self.records.iter().any(|record| record.id == id) {
            return Err(ControllerError::precondition(
                Intent::Delete,
                format!("user {id} is not in the collection"),
            ));
        }

        match self.policy.delete {
            ReconcilePolicy::Optimistic => {
                let remote = Arc::clone(&self.remote);
                self.in_flight.spawn(async move {
                    let result = remote.delete(id).await;
                    Completion::Delete { id, result }
                });
            }
            ReconcilePolicy::Confirmed => {
                if let Err(source) = self.remote.delete(id).await {
                    self.report_failure(Operation::Delete, Some(id), &source);
                    return Err(ControllerError::NetworkFailure {
                        operation: Operation::Delete,
                        source,
                    });
                }
                self.report_success(Operation::Delete, Some(id));
            }
        }

        self.records.retain(|record| record.id != id);
        if self.draft.editing_target() == Some(id) {
            let stale = std::mem::take(&mut self.draft);
            debug!(user_id = id.0, "closing edit draft of deleted user");
            self.report(DiagnosticKind::DraftDiscarded { draft: stale });
        }
        self.publish();
        Ok(())
    }

    /// Waits for every background call and applies its outcome.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.in_flight.join_next_with_id().await {
            self.apply(joined);
        }
        self.publish();
    }

    /// Applies finished background calls, republishing if any landed.
    fn reap_completed(&mut self) {
        let mut applied = false;
        while let Some(joined) = self.in_flight.try_join_next_with_id() {
            self.apply(joined);
            applied = true;
        }
        if applied {
            self.publish();
        }
    }

    fn apply(&mut self, joined: Result<(task::Id, Completion), JoinError>) {
        let completion = match joined {
            Ok((id, completion)) => {
                self.create_tasks.remove(&id);
                completion
            }
            Err(err) => {
                error!(error = %err, "background users call did not complete");
                if let Some(seq) = self.create_tasks.remove(&err.id()) {
                    self.held_creates
                        .insert(seq, Err(anyhow::anyhow!("create task failed: {err}")));
                    self.apply_held_creates();
                }
                return;
            }
        };

        match completion {
            Completion::Update { id, result } => match result {
                Ok(()) => self.report_success(Operation::Update, Some(id)),
                Err(err) => self.report_failure(Operation::Update, Some(id), &err),
            },
            Completion::Delete { id, result } => match result {
                Ok(()) => self.report_success(Operation::Delete, Some(id)),
                Err(err) => self.report_failure(Operation::Delete, Some(id), &err),
            },
            Completion::Create { seq, result } => {
                self.held_creates.insert(seq, result);
                self.apply_held_creates();
            }
        }
    }

    /// Applies held create outcomes up to the first one still outstanding.
    fn apply_held_creates(&mut self) {
        while let Some(result) = self.held_creates.remove(&self.next_create) {
            self.next_create += 1;
            match result {
                Ok(created) => {
                    info!(user_id = created.id.0, "created user");
                    self.report_success(Operation::Create, Some(created.id));
                    self.upsert(created);
                }
                Err(err) => self.report_failure(Operation::Create, None, &err),
            }
        }
    }

    fn replace_draft(&mut self, next: DraftState) {
        let previous = std::mem::replace(&mut self.draft, next);
        if !previous.is_idle() {
            debug!(draft = %previous.label(), "discarding open draft");
            self.report(DiagnosticKind::DraftDiscarded { draft: previous });
        }
    }

    fn merge(&mut self, id: UserId, fields: &UserFields) {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => *record = record.merged(fields),
            None => warn!(user_id = id.0, "edited user is no longer in the collection"),
        }
    }

    /// Appends `record`, or replaces the entry that already holds its id.
    fn upsert(&mut self, record: UserRecord) {
        match self.records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn publish(&self) {
        self.state.send_replace(self.snapshot());
    }

    fn report(&self, kind: DiagnosticKind) {
        let _ = self.diagnostics.send(Diagnostic::now(kind));
    }

    fn report_success(&self, operation: Operation, id: Option<UserId>) {
        debug!(%operation, user_id = id.map(|id| id.0), "users call succeeded");
        self.report(DiagnosticKind::RemoteCallSucceeded { operation, id });
    }

    fn report_failure(&self, operation: Operation, id: Option<UserId>, err: &anyhow::Error) {
        let message = format!("{err:#}");
        warn!(%operation, user_id = id.map(|id| id.0), error = %message, "users call failed");
        self.report(DiagnosticKind::RemoteCallFailed {
            operation,
            id,
            message,
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
