// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::fmt;
use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{DatError, DatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn read_u32<R: Read>(self, reader: &mut R) -> std::io::Result<u32> {
        match self {
            Endian::Big => reader.read_u32::<BigEndian>(),
            Endian::Little => reader.read_u32::<LittleEndian>(),
        }
    }

    pub fn write_u32<W: Write>(self, writer: &mut W, value: u32) -> std::io::Result<()> {
        match self {
            Endian::Big => writer.write_u32::<BigEndian>(value),
            Endian::Little => writer.write_u32::<LittleEndian>(value),
        }
    }
}

/// Where the file table lives inside one build of the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Exact size of the executable this layout applies to.
    pub exe_len: u64,
    /// Start of the table header; the file count sits 20 bytes past it.
    pub table_offset: u64,
    /// Encoding of the file count and of every offset/length field.
    pub endian: Endian,
    /// Distance from the end of the count field to the first entry's scan start.
    pub first_entry_gap: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameVersion {
    /// Wii release, `main.dol`.
    Wii,
    /// PSP release, `NPJH50492.BIN`.
    Psp,
}

const WII_LAYOUT: Layout = Layout {
    exe_len: 2_678_816,
    table_offset: 0x18A058,
    endian: Endian::Big,
    first_entry_gap: 152,
};

const PSP_LAYOUT: Layout = Layout {
    exe_len: 2_716_853,
    table_offset: 0x1978FC,
    endian: Endian::Little,
    first_entry_gap: 136,
};

impl GameVersion {
    pub const ALL: [GameVersion; 2] = [GameVersion::Wii, GameVersion::Psp];

    /// Classify an executable by its exact length.
    pub fn detect(exe_len: u64) -> Option<GameVersion> {
        Self::ALL.into_iter().find(|v| v.layout().exe_len == exe_len)
    }

    /// Like [`GameVersion::detect`], but an unknown length is an error.
    pub fn require(exe_len: u64) -> DatResult<GameVersion> {
        Self::detect(exe_len).ok_or(DatError::UnsupportedExecutable { len: exe_len })
    }

    pub fn layout(self) -> Layout {
        match self {
            GameVersion::Wii => WII_LAYOUT,
            GameVersion::Psp => PSP_LAYOUT,
        }
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameVersion::Wii => write!(f, "Wii"),
            GameVersion::Psp => write!(f, "PSP"),
        }
    }
}
