use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the storage/queue relay workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the relay Lambda binaries and zip each one as `bootstrap`
    ServerlessPackage {
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = Profile::Release)]
        profile: Profile,
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CiJob {
    /// fmt and clippy
    Lint,
    /// fmt, clippy and tests
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Debug,
    Release,
}

/// Lambda binary name and the zip it ships in.
const LAMBDA_ARTIFACTS: [(&str, &str); 2] = [
    ("producer_lambda", "producer.zip"),
    ("consumer_lambda", "consumer.zip"),
];

const TESTED_CRATES: [&str; 2] = ["relay_core", "relay_lambda"];

#[derive(Debug, thiserror::Error)]
enum TaskError {
    #[error("`cargo {command}` exited with status {code:?}")]
    CargoFailed { command: String, code: Option<i32> },
    #[error("rust target `{0}` is not installed; run `rustup target add {0}`")]
    MissingTarget(String),
    #[error("expected lambda binary at '{}'", .0.display())]
    MissingBinary(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Zip(#[from] ZipError),
}

fn cargo(args: &[&str]) -> Result<(), TaskError> {
    let command = args.join(" ");
    eprintln!("+ cargo {command}");
    let status = Command::new("cargo").args(args).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(TaskError::CargoFailed {
            command,
            code: status.code(),
        })
    }
}

fn run_ci(job: CiJob) -> Result<(), TaskError> {
    cargo(&["fmt", "--all", "--", "--check"])?;
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;

    if let CiJob::Check = job {
        for crate_name in TESTED_CRATES {
            cargo(&["test", "-p", crate_name])?;
        }
    }
    Ok(())
}

/// Fails early when `rustup` can list targets and `target` is not among them.
/// Without `rustup` the build itself reports the problem.
fn check_target_installed(target: &str) -> Result<(), TaskError> {
    let Ok(output) = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    else {
        return Ok(());
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        return Err(TaskError::MissingTarget(target.to_string()));
    }
    Ok(())
}

fn package(target: &str, profile: Profile, out_dir: &Path) -> Result<Vec<PathBuf>, TaskError> {
    check_target_installed(target)?;

    let mut args = vec!["build", "-p", "relay_lambda", "--target", target];
    for (bin, _) in LAMBDA_ARTIFACTS {
        args.extend(["--bin", bin]);
    }
    let profile_dir = match profile {
        Profile::Debug => "debug",
        Profile::Release => {
            args.push("--release");
            "release"
        }
    };
    cargo(&args)?;

    fs::create_dir_all(out_dir)?;
    let build_dir = Path::new("target").join(target).join(profile_dir);
    let suffix = if target.contains("windows") { ".exe" } else { "" };

    LAMBDA_ARTIFACTS
        .iter()
        .map(|(bin, zip_name)| -> Result<PathBuf, TaskError> {
            let zip_path = out_dir.join(zip_name);
            write_bootstrap_zip(&build_dir.join(format!("{bin}{suffix}")), &zip_path)?;
            Ok(zip_path)
        })
        .collect()
}

/// Lambda's custom runtime expects a single executable named `bootstrap`.
fn write_bootstrap_zip(binary: &Path, zip_path: &Path) -> Result<(), TaskError> {
    if !binary.is_file() {
        return Err(TaskError::MissingBinary(binary.to_path_buf()));
    }
    let bytes = fs::read(binary)?;

    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    zip.start_file(
        "bootstrap",
        FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755),
    )?;
    zip.write_all(&bytes)?;
    zip.finish()?;
    Ok(())
}

fn main() -> ExitCode {
    let result = match Cli::parse().command {
        Commands::Ci { job } => run_ci(job).map(|()| eprintln!("CI job passed.")),
        Commands::ServerlessPackage {
            target,
            profile,
            out_dir,
        } => package(&target, profile, &out_dir).map(|artifacts| {
            for artifact in artifacts {
                eprintln!("packaged {}", artifact.display());
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("xtask: {error}");
            ExitCode::FAILURE
        }
    }
}
