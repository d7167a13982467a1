use padhai::domain::RevisionId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone)]
pub(super) enum Action {
    /// Fetch revisions; `fresh` drops the cached list first.
    LoadRevisions { fresh: bool },
    /// `label` names the revision in the status line once it is done.
    CompleteRevision { id: RevisionId, label: String },
    LoadSubjects { fresh: bool },
    /// Chapters of the subject in the open chapter panel.
    LoadChapters,
    LoadChapterScores,
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
