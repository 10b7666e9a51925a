// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported executable: {len} bytes matches no known build")]
    UnsupportedExecutable { len: u64 },

    #[error("corrupt executable: {0}")]
    CorruptExecutable(String),

    #[error("{index:04} does not exist")]
    MissingInputFile { index: u32 },

    #[error("multiple copies of {index:04} exist ({count} files)")]
    AmbiguousInputFile { index: u32, count: usize },

    #[error("file {index:04} ({offset:#x}+{length:#x}) lies outside the archive ({archive_len:#x} bytes)")]
    ArchiveOutOfBounds {
        index: u32,
        offset: u32,
        length: u32,
        archive_len: u64,
    },

    #[error("file {index:04} does not fit in a 32-bit archive")]
    ArchiveOverflow { index: u32 },
}

pub type DatResult<T> = Result<T, DatError>;

impl DatError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptExecutable(msg.into())
    }

    /// Prefix a corrupt-table message with the entry it was raised for.
    pub(crate) fn at_entry(self, index: u32) -> Self {
        match self {
            Self::CorruptExecutable(msg) => Self::CorruptExecutable(format!("entry {:04}: {}", index, msg)),
            other => other,
        }
    }
}
