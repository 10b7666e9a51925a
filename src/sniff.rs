// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Guess an extension for an extracted file from its leading bytes.

/// ACX audio: four zero bytes, then a big-endian offset at 8..12 pointing at a 0x80 byte.
fn is_acx(data: &[u8]) -> bool {
    if data.len() < 12 || data[0..4] != [0, 0, 0, 0] {
        return false;
    }

    let offset = u32::from_be_bytes([data[8], data[9], data[10], data[11]]) as usize;
    offset
        .checked_add(1)
        .map_or(false, |end| data.len() > end && data[offset] == 0x80)
}

/// Return the extension (with its dot) for `data`, or an empty string when nothing matches.
pub fn detect_file_type(data: &[u8]) -> &'static str {
    // shared by both releases
    if data.starts_with(b"FNT\0") {
        return ".fnt";
    }
    if data.starts_with(&[0x0D, 0x0A]) {
        return ".pss";
    }
    if is_acx(data) {
        return ".acx";
    }

    // Wii
    if data.starts_with(&[b'U', 0xAA, b'8', 0x2D]) {
        return ".arc";
    }

    // PSP
    if data.starts_with(b"PK") {
        return ".zip";
    }
    if data.starts_with(b"at3c") {
        return ".a3c";
    }
    if data.starts_with(b"RIFF") {
        return ".at3";
    }
    if data.starts_with(b"#ifndef") {
        return ".h";
    }

    ""
}
