use bitmat::{
    AdaptiveMethod, AdaptiveThreshold, Canny, FilterCommand, GaussianBlur, KernelSize, Threshold, ThresholdType,
};
use clap::{Args, Parser, Subcommand};
use cli::FilterJob;
use color_eyre::eyre::Result;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Io {
    /// Path to the input image
    #[arg(short, long)]
    input: PathBuf,
    /// Path to write the filtered image
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a filter described in a TOML or JSON job file
    Apply {
        /// Path to the job file
        #[arg(short, long)]
        config: PathBuf,
        /// Override the job's input image
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Override the job's output image
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert to grayscale
    Gray {
        #[command(flatten)]
        io: Io,
    },
    /// Gaussian blur
    Blur {
        #[command(flatten)]
        io: Io,
        /// Kernel width (odd, or 0 to derive from sigma)
        #[arg(long, default_value = "125")]
        kernel_width: u32,
        /// Kernel height (odd, or 0 to derive from sigma)
        #[arg(long, default_value = "125")]
        kernel_height: u32,
        #[arg(long, default_value = "0.0")]
        sigma_x: f64,
        #[arg(long, default_value = "0.0")]
        sigma_y: f64,
    },
    /// Canny edge detection
    Canny {
        #[command(flatten)]
        io: Io,
        #[arg(long, default_value = "20.0")]
        threshold1: f64,
        #[arg(long, default_value = "255.0")]
        threshold2: f64,
    },
    /// Fixed-level threshold
    Threshold {
        #[command(flatten)]
        io: Io,
        #[arg(long, default_value = "50.0")]
        thresh: f64,
        #[arg(long, default_value = "255.0")]
        max_value: f64,
        /// binary, binary_inv, trunc, to_zero or to_zero_inv
        #[arg(long, default_value = "binary")]
        kind: ThresholdType,
    },
    /// Adaptive threshold against local means
    AdaptiveThreshold {
        #[command(flatten)]
        io: Io,
        #[arg(long, default_value = "255.0")]
        max_value: f64,
        /// mean_c or gaussian_c
        #[arg(long, default_value = "mean_c")]
        method: AdaptiveMethod,
        /// binary or binary_inv
        #[arg(long, default_value = "binary")]
        kind: ThresholdType,
        #[arg(long, default_value = "11")]
        block_size: u32,
        #[arg(long, default_value = "12.0")]
        c: f64,
    },
    /// Print the JSON schema of filter commands
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    let job = match cli.command {
        Commands::Apply { config, input, output } => {
            let mut job = FilterJob::from_file(&config)?;
            info!("Loaded job from {}", config.display());
            if let Some(input) = input {
                job.input = Some(input.display().to_string());
            }
            if let Some(output) = output {
                job.output = Some(output.display().to_string());
            }
            job
        }
        Commands::Gray { io } => job_for(io, FilterCommand::Gray),
        Commands::Blur {
            io,
            kernel_width,
            kernel_height,
            sigma_x,
            sigma_y,
        } => job_for(
            io,
            FilterCommand::GaussianBlur(GaussianBlur {
                kernel_size: KernelSize::new(kernel_width, kernel_height),
                sigma_x,
                sigma_y,
            }),
        ),
        Commands::Canny { io, threshold1, threshold2 } => {
            job_for(io, FilterCommand::Canny(Canny { threshold1, threshold2 }))
        }
        Commands::Threshold {
            io,
            thresh,
            max_value,
            kind,
        } => job_for(
            io,
            FilterCommand::Threshold(Threshold {
                thresh,
                max_value,
                kind,
            }),
        ),
        Commands::AdaptiveThreshold {
            io,
            max_value,
            method,
            kind,
            block_size,
            c,
        } => job_for(
            io,
            FilterCommand::AdaptiveThreshold(AdaptiveThreshold {
                max_value,
                method,
                kind,
                block_size,
                c,
            }),
        ),
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&FilterCommand::schema())?);
            return Ok(());
        }
    };

    if let Err(e) = job.execute() {
        error!("Filter '{}' failed: {}", job.filter, e);
        return Err(e.into());
    }

    info!("✅ Done");
    Ok(())
}

fn job_for(io: Io, filter: FilterCommand) -> FilterJob {
    FilterJob {
        input: Some(io.input.display().to_string()),
        output: Some(io.output.display().to_string()),
        filter,
    }
}
