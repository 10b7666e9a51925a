// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The file table embedded in the executable.
//!
//! As far as anyone has worked out, an entry looks like this:
//!
//! ```text
//! (4 bytes) unknown
//! (4 bytes) file offset into GAME.DAT
//! (4 bytes) file length
//! (4 bytes) unknown
//! (4 bytes) FF FF FF FF
//! (4 bytes) file number (little endian)
//! ```
//!
//! Some entries carry 24 or more extra bytes after that, so entries are found by
//! searching for the `FF FF FF FF` marker rather than by stepping a fixed size.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{DatError, DatResult};
use crate::version::{Endian, Layout};

pub const SENTINEL: u32 = 0xFFFF_FFFF;

const HEADER_SKIP: u64 = 20;
const COUNT_SIZE: u64 = 4;
const SCAN_LEAD: i64 = 16;
const SCAN_REWIND: i64 = 20;
const ENTRY_PREFIX: i64 = 4;
const ENTRY_TRAILER: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub index: u32,
    pub offset: u32,
    pub length: u32,
}

fn eof_as_corrupt(e: std::io::Error, what: &str) -> DatError {
    if e.kind() == ErrorKind::UnexpectedEof {
        DatError::corrupt(format!("stream ended while reading {}", what))
    } else {
        DatError::Io(e)
    }
}

/// Read the file count and leave the stream at the first entry's scan start.
pub fn locate_table<R: Read + Seek>(reader: &mut R, layout: &Layout) -> DatResult<u32> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    let first_entry = layout.table_offset + HEADER_SKIP + COUNT_SIZE + layout.first_entry_gap;
    if stream_len < first_entry {
        return Err(DatError::corrupt(format!(
            "table at {:#x} needs {:#x} bytes, stream has {:#x}",
            layout.table_offset, first_entry, stream_len
        )));
    }

    reader.seek(SeekFrom::Start(layout.table_offset + HEADER_SKIP))?;
    let num_files = layout
        .endian
        .read_u32(reader)
        .map_err(|e| eof_as_corrupt(e, "the file count"))?;
    reader.seek_relative(layout.first_entry_gap as i64)?;

    Ok(num_files)
}

/// Move to the start of the next entry.
///
/// Skips 16 bytes, then slides a 4 byte window forward one byte at a time until it
/// reads the sentinel, and finally backs up 20 bytes so the stream sits on the entry's
/// leading unknown field.
pub fn next_file_entry<R: Read + Seek>(reader: &mut R) -> DatResult<()> {
    reader.seek_relative(SCAN_LEAD)?;

    loop {
        let word = match reader.read_u32::<LittleEndian>() {
            Ok(word) => word,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(DatError::corrupt("no entry sentinel before end of stream"));
            }
            Err(e) => return Err(e.into()),
        };

        if word == SENTINEL {
            break;
        }

        reader.seek_relative(-3)?;
    }

    reader.seek_relative(-SCAN_REWIND)?;
    Ok(())
}

/// Read offset and length from an entry located by [`next_file_entry`], leaving the
/// stream past the entry's trailer.
pub fn read_entry_fields<R: Read + Seek>(reader: &mut R, endian: Endian) -> DatResult<(u32, u32)> {
    reader.seek_relative(ENTRY_PREFIX)?;
    let offset = endian
        .read_u32(reader)
        .map_err(|e| eof_as_corrupt(e, "an entry offset"))?;
    let length = endian
        .read_u32(reader)
        .map_err(|e| eof_as_corrupt(e, "an entry length"))?;
    reader.seek_relative(ENTRY_TRAILER)?;

    Ok((offset, length))
}

/// Overwrite offset and length of an entry located by [`next_file_entry`].
pub fn write_entry_fields<S: Write + Seek>(
    stream: &mut S,
    endian: Endian,
    offset: u32,
    length: u32,
) -> DatResult<()> {
    stream.seek_relative(ENTRY_PREFIX)?;
    endian.write_u32(stream, offset)?;
    endian.write_u32(stream, length)?;
    stream.seek_relative(ENTRY_TRAILER)?;

    Ok(())
}

/// Walk the whole table and collect every entry's offset and length.
pub fn read_table<R: Read + Seek>(reader: &mut R, layout: &Layout) -> DatResult<Vec<TableEntry>> {
    let num_files = locate_table(reader, layout)?;
    let mut entries = Vec::new();

    for index in 0..num_files {
        next_file_entry(reader).map_err(|e| e.at_entry(index))?;
        let (offset, length) = read_entry_fields(reader, layout.endian).map_err(|e| e.at_entry(index))?;
        entries.push(TableEntry { index, offset, length });
    }

    Ok(entries)
}
