//! External pulse-counting input channel
//!
//! One background reader per sensor increments a shared atomic counter for
//! each line equal to the pulse token. The session drains the counter once per
//! tick. Failures to open or read a sensor are logged and otherwise ignored:
//! that rider simply keeps receiving zero pulses.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::TcpStream;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::{self, JoinHandle};

use thiserror::Error;

/// Line content that counts as one pulse (after trimming)
pub const PULSE_TOKEN: &[u8] = b"1";

/// Pulse count shared between one producer thread and the tick loop
#[derive(Debug, Clone, Default)]
pub struct PulseCounter(Arc<AtomicU32>);

impl PulseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Take every pulse counted since the last drain
    #[inline]
    pub fn drain(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }

    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where a sensor's line stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSource {
    /// Serial device, FIFO or plain file
    Path(PathBuf),
    /// `tcp:HOST:PORT`
    Tcp(String),
}

/// Sensor source string is neither a path nor `tcp:HOST:PORT`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a device path or tcp:HOST:PORT")]
pub struct ParseSourceError;

impl FromStr for SensorSource {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(addr) = s.strip_prefix("tcp:") {
            if addr.rsplit_once(':').is_some_and(|(host, port)| !host.is_empty() && !port.is_empty()) {
                return Ok(SensorSource::Tcp(addr.to_string()));
            }
            return Err(ParseSourceError);
        }
        if s.is_empty() {
            return Err(ParseSourceError);
        }
        Ok(SensorSource::Path(PathBuf::from(s)))
    }
}

impl fmt::Display for SensorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorSource::Path(p) => write!(f, "{}", p.display()),
            SensorSource::Tcp(addr) => write!(f, "tcp:{addr}"),
        }
    }
}

impl SensorSource {
    fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        Ok(match self {
            SensorSource::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            SensorSource::Tcp(addr) => Box::new(BufReader::new(TcpStream::connect(addr.as_str())?)),
        })
    }
}

/// Count pulse lines until end of stream. Non-UTF-8 lines are skipped.
pub fn count_pulses<R: BufRead>(reader: R, counter: &PulseCounter) -> io::Result<u64> {
    let mut total = 0;
    for line in reader.split(b'\n') {
        if line?.trim_ascii() == PULSE_TOKEN {
            counter.increment();
            total += 1;
        }
    }
    Ok(total)
}

/// Start a detached reader thread for `source`. Returns `None` if the thread
/// could not be spawned; the counter then stays at zero.
pub fn spawn_reader(name: &str, source: SensorSource, counter: PulseCounter) -> Option<JoinHandle<()>> {
    let label = name.to_string();
    let spawned = thread::Builder::new()
        .name(format!("sensor-{name}"))
        .spawn(move || match source.open() {
            Ok(reader) => {
                log::info!("Sensor {label} connected to {source}");
                match count_pulses(reader, &counter) {
                    Ok(total) => log::info!("Sensor {label} closed after {total} pulses"),
                    Err(e) => log::warn!("Sensor {label} read failed, no more pulses: {e}"),
                }
            }
            Err(e) => log::warn!("Sensor {label} unavailable at {source}: {e}"),
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not start sensor thread {name}: {e}");
            None
        }
    }
}
