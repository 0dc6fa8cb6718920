mod local_dev;

pub use local_dev::{ExitReport, LocalDev, Role, STOP_TIMEOUT};
