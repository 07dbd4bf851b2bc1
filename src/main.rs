use attack_report_compiler::cli::{Cli, Command};
use attack_report_compiler::config::ReportConfig;
use attack_report_compiler::{logging, pipeline};
use clap::Parser;

fn main() {
    logging::init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> attack_report_compiler::Result<()> {
    let mut config = ReportConfig::load(&cli.config)?;
    if let Some(input_dir) = &cli.input_dir {
        config.input_dir = input_dir.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    match cli.command {
        Command::Counts => pipeline::run_counts(&config, &cli.config),
        Command::Activations => pipeline::run_activations(&config),
    }
}
