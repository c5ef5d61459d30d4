//! Console: the byte sink `printf!`/the `log` backend write through to the
//! UART. Console *input* — the line-editing buffer, `^U`/backspace,
//! `consoleintr`, and the `Devsw`/file-table plumbing that let user
//! processes `read()` from a tty — belongs to the file-system/VM surface
//! spec.md §1 puts out of scope, so none of it is ported here. `^P` still
//! dumps the process table straight from the UART ISR in a real kernel; that
//! hook point (`crate::proc::procdump`) is kept as a free function any
//! future trap handler can call, rather than threaded through a console
//! object this crate doesn't otherwise need.

use core::fmt::{Error, Write};

pub(crate) static mut CONSOLE_INSTANCE: Console = Console::create();

pub struct Console;

impl Console {
    pub const fn create() -> Self {
        Console
    }

    pub fn init() {
        crate::uart::init();
    }

    /// Send one character to the UART. Called by `printf!` and the `log`
    /// backend; never from a user-facing write() since there is none.
    pub fn putc(self: &mut Self, c: u8) {
        crate::uart::putc_sync(c);
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        for c in s.bytes() {
            self.putc(c);
        }
        Ok(())
    }
}
