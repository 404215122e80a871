use clap::{Parser, Subcommand};

/// pgslice - Postgres partitioning as easy as pie
#[derive(Parser, Debug)]
#[command(name = "pgslice")]
#[command(version)]
#[command(about = "Postgres partitioning without downtime", long_about = None)]
pub struct Cli {
    /// Database URL (overrides PGSLICE_URL and pgslice.yml)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Print SQL without executing it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an intermediate table for partitioning
    Prep {
        table: String,
        column: Option<String>,
        /// day, month or year
        period: Option<String>,

        /// Use trigger-based partitioning
        #[arg(long)]
        trigger_based: bool,

        /// Don't partition the table
        #[arg(long)]
        no_partition: bool,

        #[arg(long, hide = true)]
        test_version: Option<u32>,
    },

    /// Undo prep
    Unprep { table: String },

    /// Add partitions
    #[command(name = "add_partitions", alias = "add-partitions")]
    AddPartitions {
        table: String,

        /// Add to intermediate table
        #[arg(long)]
        intermediate: bool,

        /// Number of past partitions to add
        #[arg(long, default_value_t = 0)]
        past: u32,

        /// Number of future partitions to add
        #[arg(long, default_value_t = 0)]
        future: u32,

        /// Tablespace to use
        #[arg(long)]
        tablespace: Option<String>,

        /// Put a union view with an INSTEAD OF trigger in front of the table
        #[arg(long)]
        use_view: bool,
    },

    /// Fill the partitions in batches
    Fill {
        table: String,

        /// Batch size
        #[arg(long)]
        batch_size: Option<i64>,

        /// Use swapped table
        #[arg(long)]
        swapped: bool,

        /// Source table
        #[arg(long)]
        source_table: Option<String>,

        /// Destination table
        #[arg(long)]
        dest_table: Option<String>,

        /// Primary key to start
        #[arg(long)]
        start: Option<i64>,

        /// Conditions to filter
        #[arg(long = "where")]
        filter: Option<String>,

        /// Time to sleep between batches (seconds, or e.g. "500ms")
        #[arg(long)]
        sleep: Option<String>,

        /// Move rows through the union view
        #[arg(long)]
        use_view: bool,
    },

    /// Analyze tables
    Analyze {
        table: String,

        /// Use swapped table
        #[arg(long)]
        swapped: bool,
    },

    /// Swap the intermediate table with the original table
    Swap {
        table: String,

        /// Lock timeout
        #[arg(long)]
        lock_timeout: Option<String>,

        /// Swap out the union view
        #[arg(long)]
        use_view: bool,
    },

    /// Undo swap
    Unswap {
        table: String,

        /// Lock timeout
        #[arg(long)]
        lock_timeout: Option<String>,

        /// Restore the union view
        #[arg(long)]
        use_view: bool,
    },
}
