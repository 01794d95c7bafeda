//! Plain row types shared by every trace backend.

/// One completed window.  Times are nanoseconds; `u64::MAX` means "none".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowRow {
    pub round:           u64,
    pub window_start_ns: u64,
    pub window_end_ns:   u64,
    pub events_executed: u64,
    pub events_dropped:  u64,
    pub events_clamped:  u64,
    pub host_errors:     u64,
    pub next_start_ns:   u64,
}

/// Totals for one worker over a whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerRow {
    pub worker:          u32,
    pub events_executed: u64,
    pub events_dropped:  u64,
    pub events_clamped:  u64,
    pub host_errors:     u64,
    pub queue_pushed:    u64,
    pub queue_popped:    u64,
}
