use crate::app::{CompleteRequest, DeleteRequest, EditRequest, ForgeRequest, LogRequest};
use crate::snapshot::Snapshot;
use crate::types::{Log, MaintenanceTask};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Work queued by key handlers and run against the services off the event loop.
#[derive(Debug, Clone)]
pub(super) enum Action {
    ReloadSnapshot,
    LogActivity(LogRequest),
    UndoLog { log_id: String },
    SaveEdit(EditRequest),
    DeleteActivity(DeleteRequest),
    Create(ForgeRequest),
    LoadMaintenance,
    CompleteTask(CompleteRequest),
}

/// Result of an [`Action`], applied to `App` back on the event loop.
#[derive(Debug)]
pub(super) enum Outcome {
    SnapshotLoaded(Snapshot),
    Logged {
        request: LogRequest,
        result: Result<Log, String>,
    },
    Undone {
        log_id: String,
        result: Result<(), String>,
    },
    EditSaved {
        request: EditRequest,
        result: Result<(), String>,
    },
    Deleted {
        request: DeleteRequest,
        result: Result<(), String>,
    },
    Created {
        request: ForgeRequest,
        result: Result<(), String>,
    },
    MaintenanceLoaded(Result<Vec<MaintenanceTask>, String>),
    TaskCompleted {
        request: CompleteRequest,
        result: Result<(), String>,
    },
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;
pub(super) type OutcomeTx = UnboundedSender<Outcome>;
pub(super) type OutcomeRx = UnboundedReceiver<Outcome>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}

pub(super) fn outcome_channel() -> (OutcomeTx, OutcomeRx) {
    mpsc::unbounded_channel()
}

pub(super) fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}
