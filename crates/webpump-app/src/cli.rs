use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use webpump_config::LogLevel;

/// webpump: open a web page in a native window and pump its event loop.
#[derive(Parser, Debug)]
#[command(name = "webpump", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open SOURCE (a URL or a local HTML file) and run until the window closes.
    Run(RunArgs),
    /// Print the effective configuration as JSON.
    PrintConfig(CommonArgs),
    /// Pack SOURCE and every file next to it into a standalone executable.
    Compile(CompileArgs),
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// URL or local file to load.
    pub source: String,

    /// Poll interval in milliseconds (overrides `[bridge] interval_ms`).
    #[arg(long, allow_hyphen_values = true)]
    pub interval_ms: Option<i64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(ClapArgs, Debug)]
pub struct CompileArgs {
    /// Entry HTML file; its directory is embedded.
    pub source: PathBuf,

    /// Where to write the executable (defaults to the entry's file stem).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CompileArgs {
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => self
                .source
                .file_stem()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("webpump-app")),
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CommonArgs {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<LogLevel>,
}

impl Args {
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Command::Run(run) => &run.common,
            Command::PrintConfig(common) => common,
            Command::Compile(compile) => &compile.common,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_with_defaults() {
        let args = Args::try_parse_from(["webpump", "run", "./test.html"]).unwrap();
        let Command::Run(run) = &args.command else {
            panic!("expected run");
        };
        assert_eq!(run.source, "./test.html");
        assert_eq!(run.interval_ms, None);
        assert!(args.common().config.is_none());
        assert!(args.common().log_level.is_none());
    }

    #[test]
    fn run_with_overrides() {
        let args = Args::try_parse_from([
            "webpump",
            "run",
            "https://example.com",
            "--interval-ms",
            "16",
            "--config",
            "/tmp/webpump.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let Command::Run(run) = &args.command else {
            panic!("expected run");
        };
        assert_eq!(run.interval_ms, Some(16));
        assert_eq!(
            args.common().config.as_deref(),
            Some(std::path::Path::new("/tmp/webpump.toml"))
        );
        assert_eq!(args.common().log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn negative_interval_is_parsed() {
        let args =
            Args::try_parse_from(["webpump", "run", "a.html", "--interval-ms", "-5"]).unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.interval_ms, Some(-5));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let result =
            Args::try_parse_from(["webpump", "print-config", "--log-level", "chatty"]);
        assert!(result.is_err());
    }

    #[test]
    fn compile_output_defaults_to_entry_stem() {
        let args = Args::try_parse_from(["webpump", "compile", "site/index.html"]).unwrap();
        let Command::Compile(compile) = &args.command else {
            panic!("expected compile");
        };
        assert_eq!(compile.source, PathBuf::from("site/index.html"));
        assert_eq!(compile.output_path(), PathBuf::from("index"));

        let args =
            Args::try_parse_from(["webpump", "compile", "site/index.html", "-o", "dist/app"])
                .unwrap();
        let Command::Compile(compile) = &args.command else {
            panic!("expected compile");
        };
        assert_eq!(compile.output_path(), PathBuf::from("dist/app"));
    }

    #[test]
    fn run_requires_source() {
        assert!(Args::try_parse_from(["webpump", "run"]).is_err());
    }
}
