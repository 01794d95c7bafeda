//! The `Host` trait — the main extension point for application code.

use des_core::Packet;

use crate::{HostContext, HostResult};

/// Application logic running on one virtual host.
///
/// Every method receives a [`HostContext`] for the event being executed.
/// New work is created only through that context, never by blocking: a
/// simulated wait is a timer, a simulated send is a packet event.
///
/// # Required methods
///
/// Only [`on_boot`][Self::on_boot] is required.  The remaining hooks default
/// to doing nothing.
///
/// # Errors
///
/// Returning `Err` does not stop the simulation.  The engine records the
/// error against the host and continues with the next event.
///
/// # Example
///
/// ```rust,ignore
/// struct Beacon { peer: HostId }
///
/// impl Host for Beacon {
///     fn on_boot(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()> {
///         ctx.set_timer(1_000_000, 0)?;
///         Ok(())
///     }
///
///     fn on_timer(&mut self, _id: u64, ctx: &mut HostContext<'_>) -> HostResult<()> {
///         ctx.send_packet(self.peer, b"beacon".to_vec(), 5_000_000)?;
///         ctx.set_timer(1_000_000, 0)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Host: Send + 'static {
    /// Called when the host's boot event fires.
    fn on_boot(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()>;

    /// Called when a timer armed with [`HostContext::set_timer`] fires.
    fn on_timer(&mut self, _timer_id: u64, _ctx: &mut HostContext<'_>) -> HostResult<()> {
        Ok(())
    }

    /// Called when a packet arrives.
    fn on_packet(&mut self, _packet: Packet, _ctx: &mut HostContext<'_>) -> HostResult<()> {
        Ok(())
    }

    /// Called on every heartbeat, after the engine has logged host counters.
    fn on_heartbeat(&mut self, _ctx: &mut HostContext<'_>) -> HostResult<()> {
        Ok(())
    }

    /// Called when the host's shutdown event fires.
    fn on_shutdown(&mut self, _ctx: &mut HostContext<'_>) -> HostResult<()> {
        Ok(())
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn on_boot(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()> {
        (**self).on_boot(ctx)
    }

    fn on_timer(&mut self, timer_id: u64, ctx: &mut HostContext<'_>) -> HostResult<()> {
        (**self).on_timer(timer_id, ctx)
    }

    fn on_packet(&mut self, packet: Packet, ctx: &mut HostContext<'_>) -> HostResult<()> {
        (**self).on_packet(packet, ctx)
    }

    fn on_heartbeat(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()> {
        (**self).on_heartbeat(ctx)
    }

    fn on_shutdown(&mut self, ctx: &mut HostContext<'_>) -> HostResult<()> {
        (**self).on_shutdown(ctx)
    }
}
