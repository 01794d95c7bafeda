//! Integration tests for des-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvTraceWriter;
    use crate::row::{WindowRow, WorkerRow};
    use crate::writer::TraceWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn window_row(round: u64) -> WindowRow {
        WindowRow {
            round,
            window_start_ns: round * 10,
            window_end_ns:   round * 10 + 10,
            events_executed: round * 3,
            events_dropped:  0,
            events_clamped:  1,
            host_errors:     0,
            next_start_ns:   round * 10 + 10,
        }
    }

    fn worker_row(worker: u32) -> WorkerRow {
        WorkerRow {
            worker,
            events_executed: 40,
            events_dropped:  2,
            events_clamped:  5,
            host_errors:     1,
            queue_pushed:    42,
            queue_popped:    42,
        }
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvTraceWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("windows.csv").exists());
        assert!(dir.path().join("workers.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(&dir, "windows.csv"),
            [
                "round",
                "window_start_ns",
                "window_end_ns",
                "events_executed",
                "events_dropped",
                "events_clamped",
                "host_errors",
                "next_start_ns",
            ]
        );
        assert_eq!(
            headers(&dir, "workers.csv"),
            [
                "worker",
                "events_executed",
                "events_dropped",
                "events_clamped",
                "host_errors",
                "queue_pushed",
                "queue_popped",
            ]
        );
    }

    #[test]
    fn csv_window_rows_in_order() {
        let dir = tmp();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        for round in 1..=3 {
            w.write_window(&window_row(round)).unwrap();
        }
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("windows.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "2");
        assert_eq!(&rows[1][1], "20");
        assert_eq!(&rows[1][2], "30");
        assert_eq!(&rows[1][3], "6");
    }

    #[test]
    fn csv_worker_rows() {
        let dir = tmp();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        w.write_workers(&[worker_row(0), worker_row(1)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("workers.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "1");
        assert_eq!(&rows[1][5], "42");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_dir_is_an_error() {
        let dir = tmp();
        assert!(CsvTraceWriter::new(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn integration_csv() {
        use des_core::EngineConfig;
        use des_engine::EngineBuilder;
        use des_host::NoopHost;

        use crate::observer::TraceObserver;

        // Boots at 0, heartbeats every 20 ms until 100 ms.
        let config = EngineConfig {
            num_workers:           2,
            end_time_ns:           100_000_000,
            heartbeat_interval_ns: Some(20_000_000),
            seed:                  1,
            ..EngineConfig::default()
        };
        let mut engine = EngineBuilder::new(config).host(NoopHost).host(NoopHost).build().unwrap();

        let dir = tmp();
        let writer = CsvTraceWriter::new(dir.path()).unwrap();
        let mut obs = TraceObserver::new(writer);
        let summary = engine.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Windows at 0, 20, 40, 60, 80 ms.
        let mut rdr = csv::Reader::from_path(dir.path().join("windows.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len() as u64, summary.rounds);
        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[1][1], "20000000");
        assert_eq!(&rows[4][7], u64::MAX.to_string());

        let mut rdr = csv::Reader::from_path(dir.path().join("workers.csv")).unwrap();
        let workers: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(workers.len(), 2);
        // Each worker: one boot and four heartbeats.
        assert_eq!(&workers[0][1], "5");
    }
}

#[cfg(test)]
mod observer_tests {
    use des_core::{SimTime, Window};
    use des_engine::{EngineObserver, RoundSummary, RunSummary, WorkerStats};

    use crate::observer::TraceObserver;
    use crate::row::{WindowRow, WorkerRow};
    use crate::writer::TraceWriter;
    use crate::{OutputError, OutputResult};

    /// Fails every write after the first `ok` window rows.
    #[derive(Default)]
    struct Flaky {
        ok:       usize,
        windows:  Vec<WindowRow>,
        workers:  Vec<WorkerRow>,
        finished: bool,
    }

    impl TraceWriter for Flaky {
        fn write_window(&mut self, row: &WindowRow) -> OutputResult<()> {
            if self.windows.len() >= self.ok {
                return Err(OutputError::Io(std::io::Error::other(format!("round {}", row.round))));
            }
            self.windows.push(row.clone());
            Ok(())
        }

        fn write_workers(&mut self, rows: &[WorkerRow]) -> OutputResult<()> {
            self.workers.extend_from_slice(rows);
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn round(n: u64, next: Option<SimTime>) -> RoundSummary {
        RoundSummary {
            round:           n,
            window:          Window::new(SimTime::from_millis(n * 10), SimTime::from_millis(n * 10 + 10)),
            events_executed: n,
            events_dropped:  0,
            events_clamped:  0,
            host_errors:     0,
            next_start:      next,
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = TraceObserver::new(Flaky { ok: 1, ..Flaky::default() });
        obs.on_window_end(&round(1, Some(SimTime::from_millis(20))));
        obs.on_window_end(&round(2, Some(SimTime::from_millis(30))));
        obs.on_window_end(&round(3, None));

        let err = obs.take_error().expect("write error stored");
        assert!(err.to_string().contains("round 2"), "got {err}");
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().windows.len(), 1);
    }

    #[test]
    fn sim_end_writes_workers_and_finishes() {
        let mut obs = TraceObserver::new(Flaky { ok: usize::MAX, ..Flaky::default() });
        obs.on_window_end(&round(1, None));
        let stats = WorkerStats { events_executed: 7, ..WorkerStats::default() };
        let summary = RunSummary {
            rounds:        1,
            totals:        stats,
            workers:       vec![stats, WorkerStats::default()],
            queues:        Vec::new(),
            final_barrier: SimTime::from_millis(20),
            min_time_jump: 10_000_000,
        };
        obs.on_sim_end(&summary);
        assert!(obs.take_error().is_none());

        let w = obs.into_writer();
        assert!(w.finished);
        assert_eq!(w.windows[0].next_start_ns, u64::MAX);
        assert_eq!(w.workers.len(), 2);
        assert_eq!(w.workers[0].events_executed, 7);
        // Missing queue stats read as zero.
        assert_eq!(w.workers[1].queue_pushed, 0);
    }
}
