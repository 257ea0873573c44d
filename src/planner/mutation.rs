use color_eyre::eyre::Result;
use tracing::warn;

/// A local change applied ahead of the store call, undone if the store fails.
pub struct Optimistic<T: Clone> {
    previous: T,
}

impl<T: Clone> Optimistic<T> {
    /// Snapshot `state`, then patch it in place.
    pub fn apply(state: &mut T, patch: impl FnOnce(&mut T)) -> Self {
        let previous = state.clone();
        patch(state);
        Self { previous }
    }

    /// Keep the patch if `remote` succeeds, restore the snapshot otherwise.
    pub fn settle<R>(self, state: &mut T, remote: Result<R>) -> Result<R> {
        if let Err(err) = &remote {
            warn!(error = %err, "remote change failed, rolling back");
            *state = self.previous;
        }
        remote
    }
}
