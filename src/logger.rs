use std::{
    io::Write,
    time::{SystemTime, UNIX_EPOCH},
};

use env_logger::Builder;
use log::{LevelFilter, SetLoggerError};

/// Installs the process logger. `RUST_LOG`, when set, overrides `level`.
///
/// Lines are written as `unix_ms,level,target,message`.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(buf, "{},{},{},{}", unix_ms(), record.level(), record.target(), record.args())
        })
        .try_init()
}

/// Returns the current unix timestamp in milliseconds.
#[inline]
fn unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|ts| ts.as_millis())
        .unwrap_or_default()
}
