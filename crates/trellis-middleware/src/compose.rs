//! Two-tier middleware composition.

use trellis_core::Handler;

use crate::chain::Chain;

/// Builds the effective handler for a route.
///
/// The route's `local` chain is wrapped around `terminal` first, then the
/// router's `global` chain around that. Each chain is applied back to front
/// so its first entry ends up outermost. For `global = [A, B]` and
/// `local = [C, D]` a request runs
/// `A → B → C → D → terminal → D → C → B → A`.
///
/// With both chains empty the terminal handler is returned unchanged.
#[must_use]
pub fn compose(terminal: Handler, global: &Chain, local: &Chain) -> Handler {
    let mut next = terminal;

    for middleware in local.iter().rev() {
        tracing::trace!(middleware = middleware.name(), "wrapping route middleware");
        next = middleware.wrap(next);
    }

    for middleware in global.iter().rev() {
        tracing::trace!(middleware = middleware.name(), "wrapping global middleware");
        next = middleware.wrap(next);
    }

    next
}
