use clap::Parser;
use miette::Result;
use qmt::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `QMT_LOG` wins over `-v`
fn init_tracing(global: &GlobalOpts) {
    let default = match global.verbose {
        0 => "warn",
        1 => "qmt=debug",
        _ => "qmt=trace",
    };
    let filter = EnvFilter::try_from_env("QMT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping to `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Doc(cmd) => qmt::cli::commands::doc::run(cmd, &global),
        Commands::Proc(cmd) => qmt::cli::commands::proc::run(cmd, &global),
        Commands::Risk(cmd) => qmt::cli::commands::risk::run(cmd, &global),
        Commands::Opp(cmd) => qmt::cli::commands::opp::run(cmd, &global),
        Commands::Pdca(cmd) => qmt::cli::commands::pdca::run(cmd, &global),
        Commands::Ncr(cmd) => qmt::cli::commands::ncr::run(cmd, &global),
        Commands::Kpi(cmd) => qmt::cli::commands::kpi::run(cmd, &global),
        Commands::Status(args) => qmt::cli::commands::status::run(args, &global),
        Commands::Theme(args) => qmt::cli::commands::theme::run(args, &global),
        Commands::Export(args) => qmt::cli::commands::export::run(args, &global),
        Commands::Dispatch(args) => qmt::cli::commands::dispatch::run(args, &global),
        Commands::Reset(args) => qmt::cli::commands::reset::run(args, &global),
        Commands::Completions(args) => qmt::cli::commands::completions::run(args),
    }
}
