use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

/// Scoped navigation log for one mission run. Every inbound telemetry frame
/// is recorded as one timestamped line; the file is flushed on `close`.
pub struct SessionLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl SessionLog {
    /// Fixed log directory, created if missing.
    const LOG_DIR: &'static str = "Logs";
    /// Fixed log file name inside [`Self::LOG_DIR`].
    const LOG_FILE: &'static str = "NavLog.txt";

    pub fn open() -> std::io::Result<SessionLog> {
        std::fs::create_dir_all(Self::LOG_DIR)?;
        let path = Path::new(Self::LOG_DIR).join(Self::LOG_FILE);
        let writer = BufWriter::new(File::create(&path)?);
        Ok(SessionLog { writer, path })
    }

    pub fn path(&self) -> &Path { self.path.as_path() }

    pub fn record(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{},{line}", Utc::now().format("%H:%M:%S%.3f"));
    }

    pub fn close(mut self) {
        let _ = self.writer.flush();
    }
}
