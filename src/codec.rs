// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{DatError, DatResult};
use crate::sniff::detect_file_type;
use crate::table::{locate_table, next_file_entry, read_table, write_entry_fields, TableEntry};
use crate::version::{Endian, GameVersion, Layout};

/// Every file stored in GAME.DAT starts on a multiple of this.
pub const BLOCK_SIZE: u64 = 2048;

const ZEROS: [u8; BLOCK_SIZE as usize] = [0; BLOCK_SIZE as usize];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    TableLocated { files: u32 },
    FileExtracted { index: u32, offset: u32, length: u32, path: PathBuf },
    FileAdded { index: u32, offset: u32, length: u32, path: PathBuf },
}

pub fn padded_len(len: u64) -> u64 {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

fn entry_file_name(index: u32, extension: &str) -> String {
    format!("{:04}{}", index, extension)
}

fn open_executable(executable: &Path) -> DatResult<(File, GameVersion)> {
    let file = File::open(executable)?;
    let version = GameVersion::require(file.metadata()?.len())?;
    Ok((file, version))
}

/// Read the file table of `executable` without touching GAME.DAT.
pub fn list(executable: &Path) -> DatResult<Vec<TableEntry>> {
    let (file, version) = open_executable(executable)?;
    info!("{} executable detected", version);

    let mut reader = BufReader::new(file);
    read_table(&mut reader, &version.layout())
}

pub fn extract(executable: &Path, game_dat: &Path, output: &Path) -> DatResult<u32> {
    extract_with_progress(executable, game_dat, output, |_| {})
}

/// Extract every file listed in the executable's table from `game_dat` into `output`.
///
/// Returns the number of files written.
pub fn extract_with_progress<F>(
    executable: &Path,
    game_dat: &Path,
    output: &Path,
    on_progress: F,
) -> DatResult<u32>
where
    F: FnMut(&Progress),
{
    let (exe_file, version) = open_executable(executable)?;
    let archive_file = File::open(game_dat)?;
    info!("{} executable detected, extracting {}", version, game_dat.display());

    let mut exe = BufReader::new(exe_file);
    let mut archive = BufReader::new(archive_file);

    extract_from(&mut exe, &version.layout(), &mut archive, output, on_progress)
}

/// Extraction over already opened streams.
pub fn extract_from<R, A, F>(
    exe: &mut R,
    layout: &Layout,
    archive: &mut A,
    output: &Path,
    mut on_progress: F,
) -> DatResult<u32>
where
    R: Read + Seek,
    A: Read + Seek,
    F: FnMut(&Progress),
{
    let entries = read_table(exe, layout)?;
    let num_files = entries.len() as u32;
    info!("{} files detected", num_files);
    on_progress(&Progress::TableLocated { files: num_files });

    let archive_len = archive.seek(SeekFrom::End(0))?;
    fs::create_dir_all(output)?;

    for entry in entries {
        let end = entry.offset as u64 + entry.length as u64;
        if end > archive_len {
            return Err(DatError::ArchiveOutOfBounds {
                index: entry.index,
                offset: entry.offset,
                length: entry.length,
                archive_len,
            });
        }

        archive.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut data = vec![0u8; entry.length as usize];
        archive.read_exact(&mut data)?;

        let path = output.join(entry_file_name(entry.index, detect_file_type(&data)));
        fs::write(&path, &data)?;

        debug!(
            "extracted {} (offset = {:#x}, length = {:#x})",
            path.display(),
            entry.offset,
            entry.length
        );
        on_progress(&Progress::FileExtracted {
            index: entry.index,
            offset: entry.offset,
            length: entry.length,
            path,
        });
    }

    Ok(num_files)
}

/// Find the single input file for every index in `0..num_files`.
///
/// A file belongs to index 7 when it is named `0007` or `0007.<anything>`. Every index
/// is checked before anything is returned.
pub fn collect_inputs(input: &Path, num_files: u32) -> DatResult<Vec<PathBuf>> {
    let mut by_stem: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for dir_entry in fs::read_dir(input)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !path.is_file() {
            continue;
        }

        let name = dir_entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
        by_stem.entry(stem.to_string()).or_default().push(path);
    }

    let mut inputs = Vec::new();
    for index in 0..num_files {
        let candidates = by_stem.remove(&entry_file_name(index, "")).unwrap_or_default();
        match candidates.as_slice() {
            [] => {
                warn!("{:04} does not exist", index);
                return Err(DatError::MissingInputFile { index });
            }
            [path] => inputs.push(path.clone()),
            many => {
                warn!("multiple copies of {:04} exist", index);
                return Err(DatError::AmbiguousInputFile { index, count: many.len() });
            }
        }
    }

    Ok(inputs)
}

pub fn build(executable: &Path, input: &Path, game_dat: &Path) -> DatResult<u32> {
    build_with_progress(executable, input, game_dat, |_| {})
}

/// Rebuild `game_dat` from the files in `input` and point the executable's table at it.
///
/// The executable is patched in memory and only its table region is written back, after
/// the archive has been completely written. Returns the number of files stored.
pub fn build_with_progress<F>(
    executable: &Path,
    input: &Path,
    game_dat: &Path,
    mut on_progress: F,
) -> DatResult<u32>
where
    F: FnMut(&Progress),
{
    let mut exe_bytes = fs::read(executable)?;
    let version = GameVersion::require(exe_bytes.len() as u64)?;
    let layout = version.layout();
    info!("{} executable detected, building {}", version, game_dat.display());

    let mut exe = Cursor::new(&mut exe_bytes);
    let num_files = locate_table(&mut exe, &layout)?;
    info!("{} files detected", num_files);
    on_progress(&Progress::TableLocated { files: num_files });

    let inputs = collect_inputs(input, num_files)?;

    let mut archive = BufWriter::new(File::create(game_dat)?);
    let archive_len = patch_table(&mut exe, layout.endian, &inputs, &mut archive, &mut on_progress)?;
    archive.flush()?;

    let table_start = layout.table_offset as usize;
    let table_end = exe.position() as usize;
    let mut exe_file = OpenOptions::new().write(true).open(executable)?;
    exe_file.seek(SeekFrom::Start(layout.table_offset))?;
    exe_file.write_all(&exe_bytes[table_start..table_end])?;
    exe_file.flush()?;

    debug!("archive is {:#x} bytes", archive_len);
    Ok(num_files)
}

/// Write `inputs` into `archive` block by block, storing each file's offset and length in
/// the table. `exe` must be positioned at the first entry, as left by [`locate_table`].
///
/// Returns the total archive length.
pub fn patch_table<S, W, F>(
    exe: &mut S,
    endian: Endian,
    inputs: &[PathBuf],
    archive: &mut W,
    mut on_progress: F,
) -> DatResult<u64>
where
    S: Read + Write + Seek,
    W: Write,
    F: FnMut(&Progress),
{
    let mut offset: u64 = 0;

    for (index, path) in inputs.iter().enumerate() {
        let index = index as u32;
        let data = fs::read(path)?;

        let entry_offset = u32::try_from(offset).map_err(|_| DatError::ArchiveOverflow { index })?;
        let length = u32::try_from(data.len()).map_err(|_| DatError::ArchiveOverflow { index })?;

        next_file_entry(exe).map_err(|e| e.at_entry(index))?;
        write_entry_fields(exe, endian, entry_offset, length)?;

        archive.write_all(&data)?;
        let padded = padded_len(length as u64);
        archive.write_all(&ZEROS[..(padded - length as u64) as usize])?;

        debug!(
            "added {} (offset = {:#x}, length = {:#x})",
            path.display(),
            entry_offset,
            length
        );
        on_progress(&Progress::FileAdded {
            index,
            offset: entry_offset,
            length,
            path: path.clone(),
        });

        offset += padded;
    }

    Ok(offset)
}
