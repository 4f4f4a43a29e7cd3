use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "esedb")]
#[command(about = "Extensible Storage Engine (ESE/EDB) file reader")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the file header and database state
    Info {
        /// Path to the EDB file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Skip checksum validation while reading pages
        #[arg(long = "no-checksum")]
        no_checksum: bool,
    },

    /// List tables found in the catalog
    Tables {
        /// Path to the EDB file
        #[arg(short, long)]
        file: String,

        /// Ignore template-table column inheritance
        #[arg(long = "ignore-template-table")]
        ignore_template_table: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List a table's columns and their types
    Columns {
        /// Path to the EDB file
        #[arg(short, long)]
        file: String,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Ignore template-table column inheritance
        #[arg(long = "ignore-template-table")]
        ignore_template_table: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Dump a table's records as JSON or a text table
    Dump {
        /// Path to the EDB file
        #[arg(short, long)]
        file: String,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Maximum number of records to dump (default: all)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Ignore template-table column inheritance
        #[arg(long = "ignore-template-table")]
        ignore_template_table: bool,

        /// Output one JSON object per record instead of a text table
        #[arg(long)]
        json: bool,
    },
}
