#[cfg(not(feature = "cli"))]
compile_error!("The `esedb` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use edb::cli;
use edb::cli::app::{Cli, ColorMode, Commands};
use edb::EdbError;

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, EdbError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| EdbError::from(std::io::Error::new(e.kind(), format!("cannot create {path}: {e}")))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Info {
            file,
            json,
            no_checksum,
        } => cli::info::execute(
            &cli::info::InfoOptions {
                file,
                json,
                no_checksum,
            },
            &mut writer,
        ),

        Commands::Tables {
            file,
            ignore_template_table,
            json,
        } => cli::tables::execute(
            &cli::tables::TablesOptions {
                file,
                ignore_template_table,
                json,
            },
            &mut writer,
        ),

        Commands::Columns {
            file,
            table,
            ignore_template_table,
            json,
        } => cli::columns::execute(
            &cli::columns::ColumnsOptions {
                file,
                table,
                ignore_template_table,
                json,
            },
            &mut writer,
        ),

        Commands::Dump {
            file,
            table,
            limit,
            ignore_template_table,
            json,
        } => cli::dump::execute(
            &cli::dump::DumpOptions {
                file,
                table,
                limit,
                ignore_template_table,
                json,
            },
            &mut writer,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
