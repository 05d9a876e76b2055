use tilefind_core::logging;

mod cli;

fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    std::process::exit(cli::run_from_args());
}
