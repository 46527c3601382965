use clap::Parser;

fn main() {
    glitch_preview::init_logger();

    let cli = glitch_preview::Cli::parse();
    if let Err(e) = glitch_preview::run(cli) {
        log::error!("{e:?}");
        std::process::exit(1);
    }
}
