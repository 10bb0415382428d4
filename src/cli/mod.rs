pub mod commands;
pub mod context;
pub mod logging;
pub mod output;

use clap::{Args, Parser, Subcommand};

/// Compare configuration namespaces across clusters. Manage the portal around them.
#[derive(Parser, Debug)]
#[command(name = "nsdiff", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Portal base URL (overrides [portal] url)
    #[arg(long, global = true, env = "NSDIFF_PORTAL_URL")]
    pub portal: Option<String>,

    /// Bearer token sent to the portal (overrides [portal] token)
    #[arg(long, global = true, env = "NSDIFF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to alternative config directory (default: .nsdiff)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// One namespace looked at in several locations.
#[derive(Args, Debug)]
pub struct Selection {
    /// Application id
    #[arg(long)]
    pub app: String,

    /// Namespace name, e.g. application or datasource.yml
    #[arg(long)]
    pub namespace: String,

    /// Location as ENV or ENV:CLUSTER. Repeat: --cluster DEV --cluster PRO:east
    #[arg(long = "cluster", required = true)]
    pub clusters: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare one namespace across clusters
    Diff {
        #[command(flatten)]
        selection: Selection,

        /// Line diff of the namespace text (exactly two clusters)
        #[arg(long)]
        text: bool,

        /// Show every key, not only the differing ones
        #[arg(long)]
        all_keys: bool,

        /// Show item comments under their values and flag mismatches
        #[arg(long, conflicts_with = "text")]
        comments: bool,

        /// Read namespaces from a snapshot directory instead of the portal
        #[arg(long, value_name = "DIR")]
        snapshot: Option<String>,
    },

    /// Save namespaces from the portal into a snapshot directory
    Snapshot {
        #[command(flatten)]
        selection: Selection,

        /// Snapshot directory
        #[arg(long, value_name = "DIR")]
        out: String,
    },

    /// List the portal's environments
    Envs,

    /// Inspect or edit server configuration
    ServerConfig {
        #[command(subcommand)]
        action: ServerConfigAction,
    },

    /// Manage portal users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Inspect, create, link or delete namespaces
    Namespace {
        #[command(subcommand)]
        action: NamespaceAction,
    },

    /// Manage open-API consumer tokens
    Consumer {
        #[command(subcommand)]
        action: ConsumerAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConsumerAction {
    /// Grant an app role, or with --namespace a namespace role, to a consumer token
    Grant {
        token: String,
        #[arg(long)]
        app: String,
        /// Grant a role on this namespace instead of the whole app
        #[arg(long)]
        namespace: Option<String>,
        /// Limit the namespace role to this env. Repeat for several
        #[arg(long = "env", requires = "namespace")]
        envs: Vec<String>,
        /// Limit the namespace role to every env the portal knows
        #[arg(long, requires = "namespace", conflicts_with = "envs")]
        all_envs: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServerConfigAction {
    /// List settings of the portal DB, or of an env's config DB
    List {
        /// Config DB of this environment (default: portal DB)
        #[arg(long)]
        env: Option<String>,
        /// Only keys containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Create or update one setting
    Set {
        key: String,
        value: String,
        #[arg(long, default_value = "")]
        comment: String,
        /// Config DB of this environment (default: portal DB)
        #[arg(long)]
        env: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List users, active and inactive
    List {
        /// Only user ids containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Enable a disabled user, or disable an enabled one
    Toggle { user_id: String },
    /// Create a user
    Create {
        user_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Update a user's display name, email or password
    Update {
        user_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NamespaceAction {
    /// Show where a namespace is used
    Usage {
        #[arg(long)]
        app: String,
        namespace: String,
        /// Look at the linked namespace in ENV[:CLUSTER] instead of the app namespace
        #[arg(long, value_name = "ENV[:CLUSTER]")]
        linked: Option<String>,
    },
    /// Delete a namespace (app masters only)
    Delete {
        #[arg(long)]
        app: String,
        namespace: String,
        /// Delete the linked namespace in ENV[:CLUSTER] instead of the app namespace
        #[arg(long, value_name = "ENV[:CLUSTER]")]
        linked: Option<String>,
        /// Delete even if instances are still connected
        #[arg(long)]
        force: bool,
    },
    /// Show an app namespace definition
    Show {
        #[arg(long)]
        app: String,
        namespace: String,
    },
    /// List public namespaces
    Public,
    /// Create an app namespace
    Create {
        #[arg(long)]
        app: String,
        name: String,
        #[arg(long, default_value = "properties")]
        format: String,
        /// Make it a public namespace other apps can link
        #[arg(long)]
        public: bool,
        #[arg(long, default_value = "")]
        comment: String,
        /// Do not prefix public namespace names with the org id
        #[arg(long)]
        no_prefix: bool,
    },
    /// Link a public namespace into an app's clusters
    Link {
        #[command(flatten)]
        selection: Selection,
    },
    /// List the apps and clusters that use a public namespace
    Instances {
        #[arg(long)]
        env: String,
        namespace: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Show which clusters of an app hold unpublished changes
    PublishInfo {
        #[arg(long)]
        app: String,
    },
}
