use clap::Parser;

fn main() -> anyhow::Result<()> {
    stepcount::init();

    let cli = stepcount::cli::Cli::parse();
    cli.run()
}
