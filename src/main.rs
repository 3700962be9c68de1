mod cleanup;
mod cli;
mod config;
mod inputs;
mod logging;
mod runner;
mod scaffold;
mod templates;
mod walk;

fn main() -> anyhow::Result<()> {
    let app = cli::parse();
    logging::init(app.verbose);
    runner::run(app)
}
