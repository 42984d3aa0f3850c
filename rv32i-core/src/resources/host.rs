//! The host-communication device: a single memory-mapped `tohost` word used by the RISC-V test
//! harness convention to report PASS/FAIL and terminate the run.

use log::trace;

/// The value latched into `tohost` by the word-write that ended the run.
///
/// By convention, `1` means PASS; any other value is a FAIL code (traditionally the failing test
/// number shifted left by one with the low bit set).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TestResult(pub u32);

impl TestResult {
    pub fn is_pass(self) -> bool {
        self.0 == 1
    }
}

/// Host-communication device state: the `tohost` word plus the latched halt/result pair.
///
/// Once [`halted`](Self::halted) becomes `true`, [`test_result`](Self::test_result) is fixed for
/// the remainder of the run; later accesses to `tohost` cannot change it.
#[derive(Debug, Default, Clone)]
pub struct HostDevice {
    tohost_word: u32,
    halt: bool,
    test_result: Option<TestResult>,
}

impl HostDevice {
    /// Returns a fresh, non-halted host device with `tohost` cleared to zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halted(&self) -> bool {
        self.halt
    }

    pub fn test_result(&self) -> Option<TestResult> {
        self.test_result
    }

    /// Reads one byte of `tohost`. Offsets outside `0..=3` read as zero.
    pub fn read_byte(&self, offset: u32) -> u8 {
        match offset {
            0..=3 => self.tohost_word.to_le_bytes()[offset as usize],
            _ => 0,
        }
    }

    /// Writes one byte of `tohost`. Never asserts halt, even at offset 0: a test harness
    /// assembling `tohost` via byte stores must not terminate the run prematurely.
    pub fn write_byte(&mut self, offset: u32, value: u8) {
        if offset <= 3 {
            let mut bytes = self.tohost_word.to_le_bytes();
            bytes[offset as usize] = value;
            self.tohost_word = u32::from_le_bytes(bytes);
        }
    }

    /// Reads `tohost` as a whole word. Any offset other than `0` reads as zero.
    pub fn read_word(&self, offset: u32) -> u32 {
        if offset == 0 {
            self.tohost_word
        } else {
            0
        }
    }

    /// Writes `tohost` as a whole word at offset `0`, latching the test result and asserting
    /// halt. Subsequent writes update `tohost_word` but never overwrite an already-latched result.
    pub fn write_word(&mut self, offset: u32, value: u32) {
        if offset != 0 {
            return;
        }
        self.tohost_word = value;
        if !self.halt {
            self.halt = true;
            self.test_result = Some(TestResult(value));
            trace!("tohost word write {value:#010x}, halting");
        }
    }
}
