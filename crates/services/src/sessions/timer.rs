use tokio::task::JoinHandle;

/// Slot for the one countdown task a session may have.
///
/// Every cancel bumps `epoch`. A task only acts while its epoch is current,
/// and both the check and the cancel happen under the controller lock.
#[derive(Debug, Default)]
pub(crate) struct QuestionTimer {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl QuestionTimer {
    /// Cancel any running task and install the one built by `spawn`.
    pub(crate) fn arm(&mut self, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.cancel();
        self.handle = Some(spawn(self.epoch));
    }

    pub(crate) fn cancel(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.handle.is_some() && self.epoch == epoch
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}
