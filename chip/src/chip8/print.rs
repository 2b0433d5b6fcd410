//! The pretty print implementation of the [`ChipSet`](super::ChipSet) and the single line
//! trace used by the debug mode.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt::{self, Write};

use super::ChipSet;
use crate::devices::{DisplaySurface, InputSource};

/// The amount of opcodes shown per row of the memory dump
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::Write;

    /// will formatt the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> std::fmt::Result {
        write!(line, "{:#06X} - {:#06X} :", from, to)
    }
}

/// handles printting of any and all of intergers.
mod integer_print {
    use super::{pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    /// will format all integer types, padded to the width of the type
    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let width = 2 + 2 * std::mem::size_of::<T>();
        write!(line, "{:#0width$X}", data, width = width)
    }

    /// will pretty print all the integer data given, `HEX_PRINT_STEP` per row
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let mut res = String::new();
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
        // Remove unneded new line
        if res.ends_with(END_OF_LINE) {
            res.pop();
        }
        Ok(res)
    }
}

/// Handles the memory dump, memory is shown as opcodes
mod opcode_print {
    use super::{integer_print, pointer_print, END_OF_LINE, HEX_PRINT_STEP};
    use crate::{
        definitions::memory,
        opcode::{build_opcode, Opcode},
    };
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// The amount of bytes shown per row
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at lease two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// Prepares the line that will be used for a block of rows with only zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut zero = String::new();
        // SAFTY: writing into a string can not fail
        let _ = integer_print::formatter(&mut zero, 0u16);
        format!("{} {} {}", zero, FILLER_BASE, zero)
    });

    /// this struct will simulate a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: [Opcode; HEX_PRINT_STEP],
        only_null: bool,
    }

    impl Row {
        fn write(&self, line: &mut String) -> fmt::Result {
            pointer_print::formatter(line, self.from, self.to)?;
            if self.only_null {
                line.push(' ');
                line.push_str(&ZERO_FILLER);
            } else {
                for entry in self.data.iter() {
                    line.push(' ');
                    integer_print::formatter(line, *entry)?;
                }
            }
            Ok(())
        }
    }

    /// will pretty print the content of the raw memory, consecutive rows
    /// of zeros are merged into a single one
    pub(super) fn printer(data: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(data.len() / POINTER_INCREMENT);

        for from in (0..data.len()).step_by(POINTER_INCREMENT) {
            let to = (from + POINTER_INCREMENT).min(data.len()) - 1;

            let mut row = Row {
                from,
                to,
                data: [0; HEX_PRINT_STEP],
                only_null: true,
            };

            for (i, index) in (from..=to).step_by(memory::opcodes::SIZE).enumerate() {
                // a trailing odd byte is shown as the high byte of an opcode
                let opcode =
                    build_opcode(data, index).unwrap_or_else(|| (data[index] as Opcode) << 8);
                row.data[i] = opcode;
                row.only_null &= opcode == 0;
            }

            if row.only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row);
        }

        let mut string = String::new();
        for row in rows {
            super::indent_helper(&mut string, indent);
            row.write(&mut string)?;
            string.push(END_OF_LINE);
        }
        if string.ends_with(END_OF_LINE) {
            string.pop();
        }
        Ok(string)
    }
}

impl<D, K> ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    /// A single line describing the machine right before the current opcode
    /// executes, followed by all the registers.
    pub fn trace_line(&self) -> String {
        let mut line = format!(
            "{:04X}: {:04X} I: {:04X} SP: {:02X} delay: {:02X} sound: {:02X}\n",
            self.program_counter,
            self.opcode,
            self.index_register,
            self.stack.pointer(),
            self.timers.delay,
            self.timers.sound
        );
        for (i, r) in self.registers.iter().enumerate() {
            // SAFTY: writing into a string can not fail
            let _ = write!(line, "V{:X}:{:02X} ", i, r);
        }
        line.pop();
        line
    }

    fn chipset(&self) -> Result<String, fmt::Error> {
        let mut res = String::new();
        writeln!(res, "Chipset {{")?;
        writeln!(res, "\tname: {}", self.name)?;
        writeln!(res, "\tcompatibility level: {}", self.compat)?;
        writeln!(res, "\topcode: {:#06X}", self.opcode)?;
        writeln!(res, "\tprogram counter: {:#06X}", self.program_counter)?;
        writeln!(res, "\tindex register: {:#06X}", self.index_register)?;
        writeln!(res, "\tdelay timer: {:#04X}", self.timers.delay)?;
        writeln!(res, "\tsound timer: {:#04X}", self.timers.sound)?;
        writeln!(res, "\tregisters:")?;
        writeln!(res, "{}", integer_print::printer(&self.registers, 2)?)?;
        writeln!(res, "\tstack ({}):", self.stack.pointer())?;
        if !self.stack.is_empty() {
            writeln!(res, "{}", integer_print::printer(self.stack.frames(), 2)?)?;
        }
        writeln!(res, "\tmemory:")?;
        writeln!(res, "{}", opcode_print::printer(self.memory.as_slice(), 2)?)?;
        write!(res, "}}")?;
        Ok(res)
    }
}

impl<D, K> fmt::Display for ChipSet<D, K>
where
    D: DisplaySurface,
    K: InputSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chipset()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_formatter() {
        let mut line = String::new();
        integer_print::formatter(&mut line, 0xAu8).unwrap();
        integer_print::formatter(&mut line, 0xAu16).unwrap();
        assert_eq!("0x0A0x000A", line);
    }

    #[test]
    fn test_integer_printer() {
        let data: Vec<u8> = (0..10).collect();
        let res = integer_print::printer(&data, 1).unwrap();
        assert_eq!(
            "\t0x0000 - 0x0007 : 0x00 0x01 0x02 0x03 0x04 0x05 0x06 0x07\n\
             \t0x0008 - 0x0009 : 0x08 0x09",
            res
        );
    }

    #[test]
    fn test_opcode_printer_merges_zero_rows() {
        let mut data = vec![0u8; 64];
        data[0] = 0x12;
        data[1] = 0x34;
        let res = opcode_print::printer(&data, 0).unwrap();
        let lines: Vec<&str> = res.lines().collect();
        assert_eq!(2, lines.len());
        assert!(lines[0].starts_with("0x0000 - 0x000F : 0x1234 0x0000"));
        assert_eq!("0x0010 - 0x003F : 0x0000 ... 0x0000", lines[1]);
    }
}
