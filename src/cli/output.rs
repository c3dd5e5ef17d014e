use clap::ValueEnum;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Readable text on stdout
    #[default]
    Human,
    /// One pretty-printed JSON document on stdout
    Json,
}
