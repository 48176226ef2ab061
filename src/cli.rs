use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser, ValueEnum};

use crate::{
    config::VmConfig,
    datetime::TimeZone,
    internal_events::{VmProgramError, VmProgramExecuted, VmProgramLoadError},
    program::Program,
    trace, Vm,
};

#[derive(Parser, Debug)]
#[command(name = "vector-vm", version, rename_all = "kebab-case")]
pub struct Opts {
    /// Program files to run, in order. The format is taken from the
    /// extension (.toml, .json, .yaml or .yml).
    #[arg(required = true, value_name = "PROGRAM")]
    pub programs: Vec<PathBuf>,

    /// Read VM settings from the specified TOML file.
    #[arg(short, long, env = "VECTOR_VM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Time zone used for text without an explicit zone, either `local` or
    /// an IANA name. Overrides the config file.
    #[arg(long, value_parser = parse_timezone)]
    pub timezone: Option<TimeZone>,

    /// Print the instructions of each program instead of running it.
    #[arg(long)]
    pub disassemble: bool,

    /// Enable more detailed internal logging. Repeat to increase level. Overridden by `--quiet`.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reduce detail of internal logging. Repeat to reduce further. Overrides `--verbose`.
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Set the logging format
    #[arg(long, default_value = "text", env = "VECTOR_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Opts {
    pub const fn log_level(&self) -> &'static str {
        match self.quiet {
            0 => match self.verbose {
                0 => "info",
                1 => "debug",
                2..=255 => "trace",
            },
            1 => "warn",
            2 => "error",
            3..=255 => "off",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

fn parse_timezone(s: &str) -> Result<TimeZone, String> {
    TimeZone::parse(s).ok_or_else(|| format!("{s:?} is not a valid time zone"))
}

/// Entry point of the `vector-vm` binary.
pub fn main(opts: Opts) -> exitcode::ExitCode {
    let level = std::env::var("LOG").unwrap_or_else(|_| match opts.log_level() {
        "off" => "off".to_owned(),
        level => format!("vector_vm={level}"),
    });
    let color = io::stderr().is_terminal();
    trace::init(color, opts.log_format == LogFormat::Json, &level);

    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let stdout = io::stdout();
    run(&opts, &config, &mut stdout.lock())
}

fn load_config(opts: &Opts) -> Result<VmConfig, exitcode::ExitCode> {
    let mut config = match &opts.config {
        Some(path) => VmConfig::load(path).map_err(|error| {
            error!(message = "Configuration error.", %error);
            exitcode::CONFIG
        })?,
        None => VmConfig::default(),
    };

    if let Some(timezone) = opts.timezone {
        config.timezone = timezone;
    }

    Ok(config)
}

/// Loads and runs every program of `opts`, writing one line per result to
/// `out`.
///
/// All programs are attempted. A program that fails to load wins over one
/// that fails to run when picking the exit code.
pub fn run(opts: &Opts, config: &VmConfig, out: &mut impl Write) -> exitcode::ExitCode {
    let mut vm = Vm::with_config(config);
    let mut code = exitcode::OK;

    for path in &opts.programs {
        let program = match Program::load(path) {
            Ok(program) => program,
            Err(error) => {
                emit!(VmProgramLoadError {
                    path,
                    error: &error
                });
                code = exitcode::CONFIG;
                continue;
            }
        };

        let written = if opts.disassemble {
            disassemble(path, &program, out)
        } else {
            match vm.run(&program) {
                Ok(value) => {
                    emit!(VmProgramExecuted {
                        path,
                        result: &value
                    });
                    writeln!(out, "{}: {}", path.display(), value)
                }
                Err(error) => {
                    emit!(VmProgramError {
                        path,
                        error: &error
                    });
                    if code == exitcode::OK {
                        code = exitcode::DATAERR;
                    }
                    Ok(())
                }
            }
        };

        if let Err(error) = written {
            error!(message = "Failed writing output.", %error);
            return exitcode::IOERR;
        }
    }

    code
}

fn disassemble(path: &Path, program: &Program, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}:", path.display())?;
    for line in program.disassemble() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
