use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Logger a stdout. `RUST_LOG` tiene prioridad sobre `default_level`.
///
/// El handle debe vivir hasta el final del proceso.
pub fn init_logging(default_level: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_level)?.log_to_stdout()
                                               .format(flexi_logger::detailed_format)
                                               .start()
}
