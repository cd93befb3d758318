// Serial link to the commutator motor controller
//
// Configuration calls (open/close) and the control loop's writes come from
// different threads, so every operation runs under one lock. Writes are bounded
// by the port timeout and never retried: a dropped command is corrected by the
// next one once the deadband is exceeded again.

use std::io::Write;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_BAUD_RATE, WRITE_TIMEOUT};

/// Error types for the serial link
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port is not open")]
    NotOpen,

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Byte sink of an opened port
pub type Link = Box<dyn Write + Send>;

/// Opens links by port name; swapped for a fake in tests
pub trait Connector: Send + Sync {
    fn connect(&self, port_name: &str, baud_rate: u32) -> Result<Link>;
}

/// Real serial ports via the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortConnector;

impl Connector for SerialPortConnector {
    fn connect(&self, port_name: &str, baud_rate: u32) -> Result<Link> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: port_name.to_string(),
                source,
            })?;
        Ok(Box::new(port))
    }
}

struct OpenLink {
    name: String,
    link: Link,
}

/// Open/closed serial connection shared between configuration and the control loop
pub struct SerialTransport {
    connector: Box<dyn Connector>,
    link: Mutex<Option<OpenLink>>,
}

impl SerialTransport {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            link: Mutex::new(None),
        }
    }

    /// Transport backed by real serial ports
    pub fn serial() -> Self {
        Self::new(SerialPortConnector)
    }

    /// Open `port_name` at the default baud rate
    pub fn open(&self, port_name: &str) -> bool {
        self.open_with_baud_rate(port_name, DEFAULT_BAUD_RATE)
    }

    /// Close any existing connection, then try to open `port_name`
    ///
    /// Failure is reported and leaves the transport closed.
    pub fn open_with_baud_rate(&self, port_name: &str, baud_rate: u32) -> bool {
        let mut guard = self.link.lock();
        if let Some(previous) = guard.take() {
            info!("Closing serial port {}", previous.name);
        }

        match self.connector.connect(port_name, baud_rate) {
            Ok(link) => {
                info!("Opened serial port {} at {} baud", port_name, baud_rate);
                *guard = Some(OpenLink {
                    name: port_name.to_string(),
                    link,
                });
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    pub fn close(&self) {
        if let Some(previous) = self.link.lock().take() {
            info!("Closing serial port {}", previous.name);
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.lock().is_some()
    }

    /// Name of the open port, if any
    pub fn port_name(&self) -> Option<String> {
        self.link.lock().as_ref().map(|l| l.name.clone())
    }

    /// Write raw bytes once; a partial write is an error, not retried
    pub fn write(&self, bytes: &[u8]) -> Result<usize> {
        let mut guard = self.link.lock();
        let open = guard.as_mut().ok_or(TransportError::NotOpen)?;

        let written = open.link.write(bytes)?;
        debug!("Wrote {} bytes to {}", written, open.name);
        if written < bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(written)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    // Recording stand-in for a serial device

    use std::io::{self, Write};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::{Connector, Link, Result, TransportError};

    #[derive(Default)]
    struct DeviceState {
        writes: Vec<Vec<u8>>,
        opened: Vec<(String, u32)>,
        fail_open: bool,
        fail_write: bool,
        short_write: bool,
        write_delay: Option<Duration>,
    }

    /// Fake device shared by the connector and the test
    #[derive(Clone, Default)]
    pub struct FakeDevice(Arc<Mutex<DeviceState>>);

    impl FakeDevice {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.0.lock().writes.clone()
        }

        pub fn lines(&self) -> Vec<String> {
            self.writes()
                .into_iter()
                .map(|w| String::from_utf8_lossy(&w).into_owned())
                .collect()
        }

        pub fn opened(&self) -> Vec<(String, u32)> {
            self.0.lock().opened.clone()
        }

        pub fn set_fail_open(&self, fail: bool) {
            self.0.lock().fail_open = fail;
        }

        pub fn set_fail_write(&self, fail: bool) {
            self.0.lock().fail_write = fail;
        }

        pub fn set_short_write(&self, short: bool) {
            self.0.lock().short_write = short;
        }

        /// Make every write take `delay`, like a slow or backed-up port
        pub fn set_write_delay(&self, delay: Duration) {
            self.0.lock().write_delay = Some(delay);
        }

        pub fn connector(&self) -> FakeConnector {
            FakeConnector(self.clone())
        }
    }

    pub struct FakeConnector(FakeDevice);

    impl Connector for FakeConnector {
        fn connect(&self, port_name: &str, baud_rate: u32) -> Result<Link> {
            let mut state = (self.0).0.lock();
            if state.fail_open {
                return Err(TransportError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such port {port_name}"),
                )));
            }
            state.opened.push((port_name.to_string(), baud_rate));
            Ok(Box::new(FakeLink(self.0.clone())))
        }
    }

    struct FakeLink(FakeDevice);

    impl Write for FakeLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let delay = (self.0).0.lock().write_delay;
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            let mut state = (self.0).0.lock();
            if state.fail_write {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
            }
            let n = if state.short_write { buf.len() / 2 } else { buf.len() };
            state.writes.push(buf[..n].to_vec());
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
