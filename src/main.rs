use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;

use stepikctl::{commands, config::Config, oops, VERSION};

#[derive(Parser)]
#[command(name = "stepikctl")]
#[command(version = VERSION)]
struct Cli {
    /// Print the authorization URL instead of opening a browser
    #[arg(long, global = true)]
    no_browser: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize through the browser and check the token
    Login {
        /// Print the token as an `export STEPIK_TOKEN=...` line
        #[arg(long)]
        print_token: bool,
    },

    /// Show a single course
    Course {
        #[arg(short = 'i', long)]
        id: i64,
    },

    /// Show several courses
    Courses {
        #[arg(short = 'i', long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },

    /// Show a single section
    Section {
        #[arg(short = 'i', long)]
        id: i64,
    },

    /// Show several sections
    Sections {
        #[arg(short = 'i', long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(err) = run(cli, &config).await {
        log::error!("{:?}", err);
        oops!("{}", err);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    let open_browser = !cli.no_browser;

    match cli.commands {
        Commands::Login { print_token } => {
            commands::login::login(config, open_browser, print_token).await
        }
        Commands::Course { id } => commands::lookup::course(config, id, open_browser).await,
        Commands::Courses { ids } => commands::lookup::courses(config, &ids, open_browser).await,
        Commands::Section { id } => commands::lookup::section(config, id, open_browser).await,
        Commands::Sections { ids } => {
            commands::lookup::sections(config, &ids, open_browser).await
        }
    }
}
