use crate::export::{ExportFormat, ExportTarget};
use clap::{Parser, Subcommand};

/// Command-line interface definition for stencil-control
/// Production-line stencil cycle tracker backed by SQLite
#[derive(Parser)]
#[command(
    name = "stencil-control",
    version = env!("CARGO_PKG_VERSION"),
    about = "Stencil cycle tracker: line timers, operator credentials and tension measurements",
    long_about = None
)]
pub struct Cli {
    /// Override the stencil database path (useful for tests or custom DB)
    #[arg(global = true, long = "stencil-db")]
    pub stencil_db: Option<String>,

    /// Override the credentials database path
    #[arg(global = true, long = "cred-db")]
    pub cred_db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the databases and configuration
    Init,

    /// Start the HTTP API
    Serve {
        #[arg(long, help = "Address to bind (default from config)")]
        host: Option<String>,

        #[arg(long, help = "Port to listen on (default from config)")]
        port: Option<u16>,
    },

    /// Apply pending migrations on both databases
    Migrate,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the databases (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the stencil database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Manage operator credentials
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage stencil metadata
    Stencil {
        #[command(subcommand)]
        action: StencilAction,
    },

    /// Export cycle history or tension measurements
    Export {
        #[arg(long, value_enum, default_value = "history")]
        what: ExportTarget,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Absolute output path")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter by year/month/day or a custom range (start:end)"
        )]
        range: Option<String>,

        #[arg(long, help = "Only cycles of this line (1-based, history only)")]
        line: Option<i64>,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, default_value_t = 100, help = "Maximum rows to print")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user
    Add {
        #[arg(long)]
        usuario: String,

        #[arg(long)]
        nombre: String,

        #[arg(long, default_value = "Operador", help = "Role (Administrador for admin access)")]
        rol: String,

        #[arg(long = "badge", help = "Employee badge number (num_empleado)")]
        badge: Option<String>,

        #[arg(long)]
        password: String,
    },

    /// List users
    List,

    /// Change a user's password
    Passwd {
        #[arg(long)]
        usuario: String,

        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum StencilAction {
    /// Register a stencil
    Add {
        #[arg(long)]
        numero: String,

        #[arg(long)]
        model: Option<String>,
    },

    /// Show a stencil by id or number
    Show { identifier: String },
}
