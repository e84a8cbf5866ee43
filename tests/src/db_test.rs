use crate::{
    exec_log::ExecLog,
    logging_driver::{DriverOp, LoggingDriver},
    Setup,
};
use std::sync::{Arc, Mutex};
use tessera::Db;
use tessera_core::driver::Capability;

/// Per-test harness: owns the backend setup and the log of every operation
/// the test's database executed.
pub struct DbTest {
    setup: Box<dyn Setup>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl DbTest {
    pub fn new(setup: Box<dyn Setup>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        Self {
            setup,
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A database over a fresh backend, always with logging enabled.
    pub fn setup_db(&mut self) -> Db {
        let driver = LoggingDriver::new(self.setup.driver());
        self.ops_log = driver.ops_log_handle();
        Db::new(driver)
    }

    /// Get the operations log for assertions
    pub fn log(&mut self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }

    pub fn capability(&self) -> &'static Capability {
        self.setup.capability()
    }

    pub fn run_test(&mut self, test_fn: impl FnOnce(&mut DbTest)) {
        test_fn(self)
    }
}
