//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

use candy_board_core::protocol::{Action, Category, Command};
use candy_board_core::transport::DEFAULT_SOCKET_PATH;

use crate::settings::{DEFAULT_SERVICE_HOME, DEFAULT_TIMEOUT_MS};

/// CANDY Board Service CLI - inspect and control the modem and GNSS service
#[derive(Parser, Debug)]
#[command(name = "candy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "CANDY_NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Service response timeout in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS, env = "CANDY_TIMEOUT")]
    pub timeout: u64,

    /// Path of the service socket
    #[arg(long, global = true, default_value = DEFAULT_SOCKET_PATH, env = "CANDY_BOARD_SERVICE_SOCK")]
    pub socket: PathBuf,

    /// Install root of the service
    #[arg(long, global = true, default_value = DEFAULT_SERVICE_HOME, env = "CANDY_BOARD_SERVICE_HOME")]
    pub service_home: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the CLI version
    Version,

    /// Access point name management
    Apn(ApnArgs),

    /// Cellular network registration
    Network(NetworkArgs),

    /// SIM card information
    Sim(SimArgs),

    /// Modem information and reset
    Modem(ModemArgs),

    /// Service lifecycle (systemd) and version
    Service(ServiceArgs),

    /// Data connection control
    Connection(ConnectionArgs),

    /// GNSS receiver control
    Gnss(GnssArgs),
}

/// Suspend the data connection before the call and resume it afterwards.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LinkArgs {
    /// Suspend the data connection before talking to the modem (UART only)
    #[arg(short, long)]
    pub suspend: bool,

    /// Resume the data connection afterwards (UART only)
    #[arg(short, long)]
    pub resume: bool,
}

// ==================== APN ====================

#[derive(Args, Debug)]
pub struct ApnArgs {
    #[command(subcommand)]
    pub command: ApnCommands,
}

#[derive(Subcommand, Debug)]
pub enum ApnCommands {
    /// List configured APNs
    Ls(LinkArgs),

    /// Set the APN
    Set(ApnSetArgs),

    /// Delete an APN
    Del(ApnDelArgs),
}

#[derive(Args, Debug)]
pub struct ApnSetArgs {
    /// APN name
    #[arg(short, long)]
    pub name: String,

    /// User ID
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Password
    #[arg(short, long)]
    pub password: Option<String>,

    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct ApnDelArgs {
    /// APN name
    #[arg(short, long)]
    pub name: Option<String>,

    /// APN entry id
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub link: LinkArgs,
}

// ==================== Network ====================

#[derive(Args, Debug)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommands,
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Show network registration state
    Show(LinkArgs),

    /// Register to a network operator
    Register(NetworkRegisterArgs),

    /// Deregister from the network
    Deregister(LinkArgs),
}

#[derive(Args, Debug)]
pub struct NetworkRegisterArgs {
    /// Operator code (MCC+MNC)
    #[arg(short, long, conflicts_with = "auto")]
    pub operator: Option<String>,

    /// Let the modem pick the operator
    #[arg(short, long)]
    pub auto: bool,

    #[command(flatten)]
    pub link: LinkArgs,
}

// ==================== SIM ====================

#[derive(Args, Debug)]
pub struct SimArgs {
    #[command(subcommand)]
    pub command: SimCommands,
}

#[derive(Subcommand, Debug)]
pub enum SimCommands {
    /// Show SIM state, MSISDN and IMSI
    Show(LinkArgs),
}

// ==================== Modem ====================

#[derive(Args, Debug)]
pub struct ModemArgs {
    #[command(subcommand)]
    pub command: ModemCommands,
}

#[derive(Subcommand, Debug)]
pub enum ModemCommands {
    /// Show modem model, revision and IMEI
    Show(LinkArgs),

    /// Reset the modem to factory settings
    Reset(ModemResetArgs),
}

#[derive(Args, Debug)]
pub struct ModemResetArgs {
    /// Confirm the reset
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub link: LinkArgs,
}

// ==================== Service ====================

#[derive(Args, Debug)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommands,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ServiceCommands {
    /// Show the running service version
    Version,
    /// Start the service
    Start,
    /// Restart the service
    Restart,
    /// Stop the service
    Stop,
    /// Start the service on boot
    Enable,
    /// Do not start the service on boot
    Disable,
    /// Show the service status
    Status,
}

// ==================== Connection ====================

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    #[command(subcommand)]
    pub command: ConnectionCommands,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConnectionCommands {
    /// Show the data connection state
    Status,
    /// Suspend the data connection
    Suspend,
    /// Resume the data connection
    Resume,
}

// ==================== GNSS ====================

#[derive(Args, Debug)]
pub struct GnssArgs {
    #[command(subcommand)]
    pub command: GnssCommands,
}

#[derive(Subcommand, Debug)]
pub enum GnssCommands {
    /// Start the GNSS receiver
    Start(GnssStartArgs),
    /// Stop the GNSS receiver
    Stop,
    /// Show the GNSS receiver state
    Status,
    /// Show the current position
    Locate(GnssLocateArgs),
}

#[derive(Args, Debug)]
pub struct GnssStartArgs {
    /// Also track QZSS satellites
    #[arg(short, long)]
    pub qzss: bool,
}

#[derive(Args, Debug)]
pub struct GnssLocateArgs {
    /// Output format code understood by the service
    #[arg(short, long)]
    pub format: Option<String>,

    /// Satellite or fix id
    #[arg(long)]
    pub id: Option<String>,

    /// Include every available field
    #[arg(short, long)]
    pub all: bool,
}

// ==================== Command construction ====================

fn remote(category: Category, action: Action, link: LinkArgs) -> Command {
    Command::new(category, action).with_link_control(link.suspend, link.resume)
}

impl Commands {
    /// Build the request record for this invocation.
    pub fn into_command(self) -> Command {
        match self {
            Commands::Version => Command::version(),
            Commands::Apn(args) => match args.command {
                ApnCommands::Ls(link) => remote(Category::Apn, Action::Ls, link),
                ApnCommands::Set(set) => remote(Category::Apn, Action::Set, set.link)
                    .with_name(Some(set.name))
                    .with_user_id(set.user_id)
                    .with_password(set.password),
                ApnCommands::Del(del) => remote(Category::Apn, Action::Del, del.link)
                    .with_name(del.name)
                    .with_id(del.id),
            },
            Commands::Network(args) => match args.command {
                NetworkCommands::Show(link) => remote(Category::Network, Action::Show, link),
                NetworkCommands::Register(reg) => {
                    remote(Category::Network, Action::Register, reg.link)
                        .with_operator(reg.operator)
                        .with_auto(reg.auto)
                }
                NetworkCommands::Deregister(link) => {
                    remote(Category::Network, Action::Deregister, link)
                }
            },
            Commands::Sim(args) => match args.command {
                SimCommands::Show(link) => remote(Category::Sim, Action::Show, link),
            },
            Commands::Modem(args) => match args.command {
                ModemCommands::Show(link) => remote(Category::Modem, Action::Show, link),
                ModemCommands::Reset(reset) => {
                    remote(Category::Modem, Action::Reset, reset.link).with_yes(reset.yes)
                }
            },
            Commands::Service(args) => {
                let action = match args.command {
                    ServiceCommands::Version => Action::Version,
                    ServiceCommands::Start => Action::Start,
                    ServiceCommands::Restart => Action::Restart,
                    ServiceCommands::Stop => Action::Stop,
                    ServiceCommands::Enable => Action::Enable,
                    ServiceCommands::Disable => Action::Disable,
                    ServiceCommands::Status => Action::Status,
                };
                Command::new(Category::Service, action)
            }
            Commands::Connection(args) => {
                let action = match args.command {
                    ConnectionCommands::Status => Action::Status,
                    ConnectionCommands::Suspend => Action::Suspend,
                    ConnectionCommands::Resume => Action::Resume,
                };
                Command::new(Category::Connection, action)
            }
            Commands::Gnss(args) => match args.command {
                GnssCommands::Start(start) => {
                    Command::new(Category::Gnss, Action::Start).with_qzss(start.qzss)
                }
                GnssCommands::Stop => Command::new(Category::Gnss, Action::Stop),
                GnssCommands::Status => Command::new(Category::Gnss, Action::Status),
                GnssCommands::Locate(locate) => Command::new(Category::Gnss, Action::Locate)
                    .with_format(locate.format)
                    .with_id(locate.id)
                    .with_all(locate.all),
            },
        }
    }
}
