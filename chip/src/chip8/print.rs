//! The pretty print implementation of the [`Machine`](super::Machine) state, used to dump
//! everything into the log when a run goes wrong.

use std::fmt::{self, Write};

use once_cell::sync::Lazy;

use super::Machine;
use crate::{
    definitions::{cpu, keyboard},
    timer::TimedWorker,
};

/// How many entries are printed per row.
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// The length of a formatted integer, `0x` and four digits.
static INTEGER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    // formatting into a string can not fail
    let _ = integer_print::formatter(&mut line, 0u16);
    line.len()
});

/// The length of a `from - to :` prefix.
static POINTER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    let _ = pointer_print::formatter(&mut line, 0, 0);
    line.len()
});

/// An upper bound of a single printed row.
static LENLINE: Lazy<usize> =
    Lazy::new(|| INDENT_SIZE + *POINTER_LEN + 1 + HEX_PRINT_STEP * (*INTEGER_LEN + 1));

fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// Drops the trailing line break, if there is one.
fn trim_last_line(text: &mut String) {
    if text.ends_with(END_OF_LINE) {
        text.pop();
    }
}

mod pointer_print {
    use std::fmt::{self, Write};

    /// will format the range a row covers
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
        write!(line, "{:#06X} - {:#06X} :", from, to)
    }
}

mod integer_print {
    use std::fmt::{self, Write};

    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};

    pub(super) fn formatter<T: fmt::UpperHex>(line: &mut String, data: T) -> fmt::Result {
        write!(line, "{:#06X}", data)
    }

    /// will print the data in rows of [`HEX_PRINT_STEP`](super::HEX_PRINT_STEP) entries,
    /// each prefixed with the covered offsets
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Copy,
    {
        let rows = (data.len() + HEX_PRINT_STEP - 1) / HEX_PRINT_STEP;
        let mut res = String::with_capacity(*super::LENLINE * rows);

        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(END_OF_LINE);
        }

        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Prints the memory as opcodes, runs of rows that contain nothing but zeros
/// are merged into a single filler row.
mod opcode_print {
    use std::fmt::{self, Write};

    use once_cell::sync::Lazy;

    use super::{integer_print, pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use crate::{
        definitions::memory,
        opcode::{self, Opcode},
    };

    /// The amount of bytes a single row covers
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE as usize;
    const FILLER_BASE: &str = "...";

    /// The row content used for rows of zeros, as wide as a regular row.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut zero = String::new();
        let _ = integer_print::formatter(&mut zero, 0u16);

        let width = zero.len() * HEX_PRINT_STEP + (HEX_PRINT_STEP - 1);
        let gap = (width - 2 * zero.len() - FILLER_BASE.len()) / 2;
        let filler = " ".repeat(gap);
        format!("{}{}{}{}{}", zero, filler, FILLER_BASE, filler, zero)
    });

    struct Row {
        from: usize,
        to: usize,
        data: Vec<Opcode>,
    }

    impl Row {
        fn only_null(&self) -> bool {
            self.data.iter().all(|opcode| *opcode == 0)
        }
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(*super::LENLINE);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if self.only_null() {
                res.push_str(&ZERO_FILLER);
            } else {
                let mut entries = self.data.iter();
                if let Some(first) = entries.next() {
                    integer_print::formatter(&mut res, *first)?;
                }
                for entry in entries {
                    res.push(' ');
                    integer_print::formatter(&mut res, *entry)?;
                }
            }
            f.write_str(&res)
        }
    }

    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT + 1);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            let to = (from + POINTER_INCREMENT).min(memory.len()) - 1;
            let data = (from..to)
                .step_by(memory::opcodes::SIZE as usize)
                .map(|pointer| opcode::build_opcode(memory, pointer).map_err(|_| fmt::Error))
                .collect::<Result<Vec<_>, _>>()?;

            let mut row = Row { from, to, data };
            if row.only_null() {
                if let Some(last) = rows.last() {
                    if last.only_null() {
                        row.from = last.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row);
        }

        let mut res = String::with_capacity((*super::LENLINE + 1) * rows.len());
        for row in rows {
            super::indent_helper(&mut res, indent);
            write!(res, "{}{}", row, END_OF_LINE)?;
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Prints the keypad as a row of flags per key.
mod bool_print {
    use std::fmt;

    use once_cell::sync::Lazy;

    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};

    static TRUE: Lazy<String> = Lazy::new(|| formatter("true"));
    static FALSE: Lazy<String> = Lazy::new(|| formatter("false"));

    /// pads the word up to the width of an integer
    fn formatter(word: &str) -> String {
        format!("{:<width$}", word, width = *super::INTEGER_LEN)
    }

    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, fmt::Error> {
        let mut res = String::with_capacity(*super::LENLINE * data.len() / HEX_PRINT_STEP);

        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            let mut line = String::new();
            for value in chunk {
                line.push(' ');
                line.push_str(if *value { TRUE.as_str() } else { FALSE.as_str() });
            }
            res.push_str(line.trim_end());
            res.push(END_OF_LINE);
        }

        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// A single value on its own indented line.
fn value_print<T: fmt::UpperHex>(value: T) -> Result<String, fmt::Error> {
    let mut res = String::with_capacity(INDENT_SIZE + *INTEGER_LEN);
    indent_helper(&mut res, INDENT_SIZE);
    integer_print::formatter(&mut res, value)?;
    Ok(res)
}

impl<W: TimedWorker> fmt::Display for Machine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prc = value_print(self.program_counter)?;
        let opc = value_print(self.opcode)?;
        let idx = value_print(self.index_register)?;
        let del = value_print(self.timers.delay())?;
        let snd = value_print(self.timers.sound())?;

        let reg = integer_print::printer(&self.registers, INDENT_SIZE)?;

        // the stack is filled up, so that empty slots show as well
        let mut stack = [0u16; cpu::stack::SIZE];
        for (slot, address) in stack.iter_mut().zip(self.stack.entries()) {
            *slot = address;
        }
        let sta = integer_print::printer(&stack, INDENT_SIZE)?;

        let mut keys = [false; keyboard::SIZE];
        for key in self.keys.pressed() {
            if let Some(slot) = keys.get_mut(key as usize) {
                *slot = true;
            }
        }
        let key = bool_print::printer(&keys, INDENT_SIZE)?;

        let mem = opcode_print::printer(&self.memory, INDENT_SIZE)?;

        write!(
            f,
            "Machine {{\n\
                \tProgram Counter :\n{}\n\
                \tOpcode :\n{}\n\
                \tIndex Register :\n{}\n\
                \tDelay Timer :\n{}\n\
                \tSound Timer :\n{}\n\
                \tRegister :\n{}\n\
                \tStack :\n{}\n\
                \tKeyboard :\n{}\n\
                \tMemory :\n{}\n\
                }}",
            prc, opc, idx, del, snd, reg, sta, key, mem
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::{chip8::Machine, definitions::Config, timer::Worker};

    const OUTPUT_PRINT: &str = "\
        Machine {\n\
            \tProgram Counter :\n\
                \t\t0x0202\n\
            \tOpcode :\n\
                \t\t0x6A02\n\
            \tIndex Register :\n\
                \t\t0x0000\n\
            \tDelay Timer :\n\
                \t\t0x0000\n\
            \tSound Timer :\n\
                \t\t0x0000\n\
            \tRegister :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0002 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tStack :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tKeyboard :\n\
                \t\t0x0000 - 0x0007 : false  true   false  true   false  true   false  true\n\
                \t\t0x0008 - 0x000F : false  true   false  true   false  true   false  true\n\
            \tMemory :\n\
                \t\t0x0000 - 0x004F : 0x0000                    ...                    0x0000\n\
                \t\t0x0050 - 0x005F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0\n\
                \t\t0x0060 - 0x006F : 0x10F0 0x10F0 0x9090 0xF010 0x10F0 0x80F0 0x10F0 0xF080\n\
                \t\t0x0070 - 0x007F : 0xF090 0xF0F0 0x1020 0x4040 0xF090 0xF090 0xF0F0 0x90F0\n\
                \t\t0x0080 - 0x008F : 0x10F0 0xF090 0xF090 0x90E0 0x90E0 0x90E0 0xF080 0x8080\n\
                \t\t0x0090 - 0x009F : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080\n\
                \t\t0x00A0 - 0x01FF : 0x0000                    ...                    0x0000\n\
                \t\t0x0200 - 0x020F : 0x6A02 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0210 - 0x0FFF : 0x0000                    ...                    0x0000\n\
        }";

    #[test]
    fn test_full_print() {
        let mut machine: Machine<Worker> = Machine::new(Config::default());
        machine.timers_mut().stop();
        machine.load_rom(&[0x6A, 0x02]).unwrap();
        machine.next().unwrap();

        // pressed in the future, so they are still held while printing
        let keys = machine.keys();
        let later = Instant::now() + Duration::from_secs(60);
        for key in (0..16).filter(|key| key % 2 != 0) {
            keys.add_at(key, later);
        }

        let actual = machine.to_string();
        for (exp, act) in OUTPUT_PRINT.lines().zip(actual.lines()) {
            assert_eq!(exp, act);
        }
        assert_eq!(OUTPUT_PRINT.lines().count(), actual.lines().count());
    }

    #[test]
    fn test_stack_shows_up() {
        let mut machine: Machine<Worker> = Machine::new(Config::default());
        machine.timers_mut().stop();
        machine.stack.push(0x0ABC).unwrap();

        let actual = machine.to_string();
        assert!(actual.contains(
            "\t\t0x0000 - 0x0007 : 0x0ABC 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000"
        ));
    }
}
