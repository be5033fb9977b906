use clap::Parser;
use miette::Result;
use pb::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for readable diagnostics
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

    match cli.command {
        Commands::Init(args) => pb::cli::commands::init::run(args),
        Commands::Cmp(cmd) => pb::cli::commands::cmp::run(cmd, &global),
        Commands::Sup(cmd) => pb::cli::commands::sup::run(cmd, &global),
        Commands::Proj(cmd) => pb::cli::commands::proj::run(cmd, &global),
        Commands::Bom(cmd) => pb::cli::commands::bom::run(cmd, &global),
        Commands::Prices(cmd) => pb::cli::commands::prices::run(cmd, &global),
        Commands::Alerts(args) => pb::cli::commands::alerts::run(args, &global),
        Commands::Status(args) => pb::cli::commands::status::run(args, &global),
        Commands::Report(cmd) => pb::cli::commands::report::run(cmd, &global),
        Commands::Backup(cmd) => pb::cli::commands::backup::run(cmd, &global),
        Commands::Completions(args) => pb::cli::commands::completions::run(args),
    }
}
