//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "prompt", version, about = "Interactive command-line editor with semantic highlighting")]
pub struct Args {
    /// Main config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Drop-in config directory
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Named theme
    #[arg(short, long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Category-map expansion depth (0 = none)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub granularity: u32,

    /// Disable styling
    #[arg(long)]
    pub no_color: bool,

    /// Print edited line on normal exit
    #[arg(short, long)]
    pub print: bool,

    /// The command line to edit
    pub command: Vec<String>,
}

impl Args {
    /// Join the positional tail into the initial buffer text.
    pub fn initial_text(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_positional_tail_with_spaces() {
        let args = Args {
            config: None,
            config_dir: None,
            theme: None,
            granularity: 0,
            no_color: false,
            print: false,
            command: vec!["gcc".to_string(), "-O2".to_string(), "main.c".to_string()],
        };
        assert_eq!(args.initial_text(), "gcc -O2 main.c");
    }
}
