use clap::{Parser, Subcommand};

use self::{anova::AnovaArg, sample::SampleArg};

mod anova;
mod sample;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// One-way ANOVA followed by Tukey's HSD pairwise comparison
    Anova(#[clap(flatten)] AnovaArg),
    /// Generate noisy samples of a known function
    Sample(#[clap(flatten)] SampleArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Anova(AnovaArg::default())) {
        Mode::Anova(arg) => anova::run(&arg)?,
        Mode::Sample(arg) => sample::run(&arg)?,
    }
    Ok(())
}
