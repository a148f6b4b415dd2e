use std::io::{stdout, Write};
use std::sync::Mutex;

use log::error;

// Receives every value PRN (and MUL) puts out.
pub trait Printer: Send + Sync {
    fn print(&self, val: i64);
}

#[derive(Default, Debug, Clone, Copy)]
pub struct StdoutPrinter();

impl Printer for StdoutPrinter {
    fn print(&self, val: i64) {
        let mut out = stdout().lock();
        if let Err(e) = writeln!(out, "{val}").and_then(|_| out.flush()) {
            error!("Failed to print {val}: {e}");
        }
    }
}


#[derive(Default, Debug)]
pub struct PipePrinter {
    buf: Mutex<Vec<i64>>,
}

impl Printer for PipePrinter {
    fn print(&self, val: i64) {
        self.lock().push(val);
    }
}

impl PipePrinter {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<i64>> {
        // A poisoned buffer still holds good output.
        self.buf.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn take(&self) -> Vec<i64> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
