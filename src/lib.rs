// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Extract and rebuild `GAME.DAT` together with the file table stored in the game's
//! executable (`main.dol` on Wii, `NPJH50492.BIN` on PSP).

mod codec;
mod error;
mod sniff;
mod table;
mod version;

pub use codec::{
    build, build_with_progress, collect_inputs, extract, extract_with_progress, extract_from, list,
    padded_len, patch_table, Progress, BLOCK_SIZE,
};
pub use error::{DatError, DatResult};
pub use sniff::detect_file_type;
pub use table::{locate_table, next_file_entry, read_entry_fields, read_table, write_entry_fields, TableEntry, SENTINEL};
pub use version::{Endian, GameVersion, Layout};
