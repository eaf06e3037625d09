/// Runs a cleanup closure when dropped, including during a panic unwind.
///
/// Used to restore the terminal after the browser exits and to release the
/// sampler's PID file when the listener stops.
///
/// # Examples
///
/// ```
/// use clipboard_history::utils::context::Context;
///
/// let _guard = Context::with(|| {
///     println!("Cleanup executed!");
/// });
/// ```
pub struct Context<AtExit: FnOnce()> {
    exit_cb: Option<AtExit>,
}

impl<F: FnOnce()> Context<F> {
    /// Guard that calls `f` on drop.
    pub fn with(f: F) -> Self {
        Self { exit_cb: Some(f) }
    }
}

impl<F: FnOnce()> Drop for Context<F> {
    fn drop(&mut self) {
        if let Some(f) = self.exit_cb.take() {
            f()
        }
    }
}
