//! Command-line argument definitions.

use clap::Parser as ClapParser;

/// Arguments accepted by the `rpc` binary.
///
/// The command surface keeps both spellings of every action:
/// `rpc compile in.rp out.rpx`, `rpc -c in.rp out.rpx`, a bare
/// `rpc in.rp out.rpx`, and `rpc interactive` / `rpc -i`.
#[derive(ClapParser, Debug)]
#[command(
    name = "rpc",
    about = "R+ programming language compiler",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Compile a source file
    #[arg(short = 'c', value_name = "INPUT")]
    pub compile: Option<String>,

    /// Run the interactive interpreter
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// `compile <input> [output]`, `interactive`, or `<input> [output]`
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// The action a parsed command line resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print version text
    Version,
    /// Start the interactive interpreter
    Interactive,
    /// Compile `input` into `output`
    Compile {
        /// Source file path
        input: String,
        /// Output file path
        output: String,
    },
    /// No recognizable command; print usage
    Usage,
}

/// Default output path when none is given.
pub const DEFAULT_OUTPUT: &str = "output.rpx";

impl Cli {
    /// Resolve flags and positional arguments into a single command.
    pub fn command(&self) -> Command {
        if self.version {
            return Command::Version;
        }
        if self.interactive {
            return Command::Interactive;
        }
        if let Some(input) = &self.compile {
            let output = self
                .args
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
            return Command::Compile {
                input: input.clone(),
                output,
            };
        }

        match self.args.first().map(String::as_str) {
            Some("interactive") => Command::Interactive,
            Some("compile") => match self.args.get(1) {
                Some(input) => Command::Compile {
                    input: input.clone(),
                    output: self
                        .args
                        .get(2)
                        .cloned()
                        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
                },
                None => Command::Usage,
            },
            Some(input) => Command::Compile {
                input: input.to_string(),
                output: self
                    .args
                    .get(1)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            },
            None => Command::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_version_flag() {
        assert_eq!(parse(&["rpc", "-v"]).command(), Command::Version);
        assert_eq!(parse(&["rpc", "--version"]).command(), Command::Version);
    }

    #[test]
    fn test_interactive_forms() {
        assert_eq!(parse(&["rpc", "-i"]).command(), Command::Interactive);
        assert_eq!(
            parse(&["rpc", "interactive"]).command(),
            Command::Interactive
        );
    }

    #[test]
    fn test_compile_subcommand() {
        assert_eq!(
            parse(&["rpc", "compile", "hello.rp"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: DEFAULT_OUTPUT.to_string(),
            }
        );
        assert_eq!(
            parse(&["rpc", "compile", "hello.rp", "out.rpx"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: "out.rpx".to_string(),
            }
        );
    }

    #[test]
    fn test_compile_short_flag() {
        assert_eq!(
            parse(&["rpc", "-c", "hello.rp"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: DEFAULT_OUTPUT.to_string(),
            }
        );
        assert_eq!(
            parse(&["rpc", "-c", "hello.rp", "out.rpx"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: "out.rpx".to_string(),
            }
        );
    }

    #[test]
    fn test_bare_input_file() {
        assert_eq!(
            parse(&["rpc", "hello.rp"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: DEFAULT_OUTPUT.to_string(),
            }
        );
        assert_eq!(
            parse(&["rpc", "hello.rp", "custom.rpx"]).command(),
            Command::Compile {
                input: "hello.rp".to_string(),
                output: "custom.rpx".to_string(),
            }
        );
    }

    #[test]
    fn test_no_args_is_usage() {
        assert_eq!(parse(&["rpc"]).command(), Command::Usage);
    }

    #[test]
    fn test_compile_without_input_is_usage() {
        assert_eq!(parse(&["rpc", "compile"]).command(), Command::Usage);
    }
}
