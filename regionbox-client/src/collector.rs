use regionbox_core::NativeValue;

/// Receiver of function execution results.
///
/// The client's execution runtime calls [`add_result`](Self::add_result) for
/// every result as it arrives, then [`end_results`](Self::end_results) exactly
/// once. Both are called on client-owned threads.
pub trait ResultCollector: Send + Sync {
    /// Accepts one result.
    fn add_result(&self, value: NativeValue);

    /// Signals that no further results follow.
    fn end_results(&self);
}
