// pp20th-dat
// Copyright (c) 2024 Matthew Costa <ucosty@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use pp20th_dat::{build_with_progress, extract_with_progress, list, Progress};

#[derive(Parser)]
#[command(version, about = "An extractor/builder for GAME.DAT", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the contents of GAME.DAT
    Extract {
        /// Executable holding the file table (usually main.dol or NPJH50492.BIN)
        executable: PathBuf,

        /// GAME.DAT to read
        game_dat: PathBuf,

        /// Directory to extract the contents to
        output_path: PathBuf,
    },

    /// Build GAME.DAT from a directory and update the executable's file table
    Build {
        /// Executable holding the file table, modified in place
        executable: PathBuf,

        /// Directory containing the files to add, named 0000.ext, 0001.ext, ...
        input_path: PathBuf,

        /// GAME.DAT to write
        game_dat: PathBuf,
    },

    /// List the offset and length of every file in the executable's table
    List {
        /// Executable holding the file table
        executable: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn require_file(path: &PathBuf) -> Result<(), Box<dyn Error>> {
    if !path.is_file() {
        return Err(format!("{} does not exist.", path.display()).into());
    }
    Ok(())
}

fn print_progress(progress: &Progress) {
    match progress {
        Progress::TableLocated { files } => println!("{} files detected.", files),
        Progress::FileExtracted { path, .. } => println!("Extracted {}", path.display()),
        Progress::FileAdded { index, offset, length, .. } => {
            println!("Added {:04}: offset = {:#x}, length = {:#x}", index, offset, length)
        }
    }
}

fn extract_command(executable: &PathBuf, game_dat: &PathBuf, output_path: &PathBuf) -> Result<(), Box<dyn Error>> {
    require_file(executable)?;
    require_file(game_dat)?;

    let count = extract_with_progress(executable, game_dat, output_path, print_progress)?;
    println!("Extracted {} files to {}", count, output_path.display());

    Ok(())
}

fn build_command(executable: &PathBuf, input_path: &PathBuf, game_dat: &PathBuf) -> Result<(), Box<dyn Error>> {
    require_file(executable)?;
    if !input_path.is_dir() {
        return Err(format!("{} does not exist.", input_path.display()).into());
    }

    let count = build_with_progress(executable, input_path, game_dat, print_progress)?;
    println!("Built {} with {} files", game_dat.display(), count);

    Ok(())
}

fn list_command(executable: &PathBuf) -> Result<(), Box<dyn Error>> {
    require_file(executable)?;

    for entry in list(executable)? {
        println!("{:04}: offset = {:#x}, length = {:#x}", entry.index, entry.offset, entry.length);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Extract { executable, game_dat, output_path } => extract_command(executable, game_dat, output_path)?,
        Commands::Build { executable, input_path, game_dat } => build_command(executable, input_path, game_dat)?,
        Commands::List { executable } => list_command(executable)?,
    }

    Ok(())
}
