use azure_nsg_access::output::terminal;
use azure_nsg_access::{app, args::Args};
use clap::Parser;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }
    init_logging();

    if let Err(e) = app::run(args).await {
        terminal::error(&e.to_string());
        std::process::exit(1);
    }
}

/// A `log4rs.yml` next to the working directory wins; otherwise log
/// warnings and errors to stderr so they interleave with normal output.
fn init_logging() {
    if log4rs::init_file("log4rs.yml", Default::default()).is_ok() {
        return;
    }
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(log::LevelFilter::Warn));
    if let Ok(config) = config {
        let _ = log4rs::init_config(config);
    }
}
