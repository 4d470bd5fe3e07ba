use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Report source rows that will not fit the destination schema.
    Validate,
    /// Report source rows with no matching row in the destination.
    Verify,
    /// Copy rows missing from the destination.
    Migrate {
        /// Truncate each destination table before migrating it.
        #[arg(long)]
        truncate: bool,
    },
}
