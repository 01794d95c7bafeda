//! A host that boots and then ignores everything.

use crate::{Host, HostContext, HostResult};

/// A [`Host`] with no behavior.
///
/// Useful as a placeholder in tests or for passive hosts that only need to
/// exist as packet destinations.
pub struct NoopHost;

impl Host for NoopHost {
    fn on_boot(&mut self, _ctx: &mut HostContext<'_>) -> HostResult<()> {
        Ok(())
    }
}
