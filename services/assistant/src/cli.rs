//! services/assistant/src/cli.rs
//!
//! Command line arguments of the `assistant` binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assistant")]
#[command(version)]
#[command(about = "Upload medical records, summarize them, and ask questions about them")]
pub struct Cli {
    /// Documents to upload as soon as the session starts
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn positional_arguments_are_files() {
        let cli = Cli::try_parse_from(["assistant", "labs.txt", "scan.pdf"]).unwrap();
        assert_eq!(cli.files, [PathBuf::from("labs.txt"), PathBuf::from("scan.pdf")]);
    }

    #[test]
    fn no_arguments_starts_empty() {
        let cli = Cli::try_parse_from(["assistant"]).unwrap();
        assert!(cli.files.is_empty());
    }

    #[test]
    fn help_flag_is_not_a_file() {
        let err = Cli::try_parse_from(["assistant", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = Cli::try_parse_from(["assistant", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
