use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective configuration, secrets redacted
    Config {
        /// Write a default configuration file instead
        #[arg(required = false, long)]
        init: bool,
    },

    /// Manage products
    #[command(subcommand)]
    Products(ProductAction),

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryAction),

    /// Manage product images
    #[command(subcommand)]
    Images(ImageAction),

    /// Manage simple contacts
    #[command(subcommand)]
    Contacts(ContactAction),

    /// Manage quote requests
    #[command(subcommand)]
    Quotes(QuoteAction),

    /// Show or change the store settings
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Create a back-office account
    Signup {
        /// Display name
        #[arg(required = true, long)]
        nome: String,

        /// Account email
        #[arg(required = true, long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(required = false, long)]
        senha: Option<String>,

        /// Sign-up admin password (prompted when omitted)
        #[arg(required = false, long)]
        admin_password: Option<String>,
    },

    /// Log in and print a session token
    Login {
        /// Account email
        #[arg(required = true, long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(required = false, long)]
        senha: Option<String>,
    },

    /// Inspect session tokens
    #[command(subcommand)]
    Session(SessionAction),

    /// Change the name or password of a logged-in account
    #[command(subcommand)]
    Profile(ProfileAction),
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, newest first
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Only products of this category
        #[arg(required = false, long)]
        categoria: Option<String>,
    },

    /// Show a product with its images and category
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// Create a product
    Create {
        #[command(flatten)]
        fields: ProductFields,

        /// Image URLs, in display order
        #[arg(required = false, long = "image")]
        images: Vec<String>,
    },

    /// Update a product
    Update {
        #[arg(required = true)]
        id: String,

        #[arg(required = false, long)]
        nome: Option<String>,

        #[arg(required = false, long)]
        descricao: Option<String>,

        #[arg(required = false, long)]
        preco: Option<f64>,

        #[arg(required = false, long)]
        estoque: Option<i64>,

        #[arg(required = false, long)]
        categoria: Option<String>,

        /// Replace the product images with these URLs
        #[arg(required = false, long = "image")]
        images: Option<Vec<String>>,
    },

    /// Delete a product
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: String,
    },
}

#[derive(ClapArgs)]
pub struct ProductFields {
    #[arg(required = true, long)]
    pub nome: String,

    #[arg(required = false, long)]
    pub descricao: Option<String>,

    #[arg(required = true, long)]
    pub preco: f64,

    #[arg(required = false, long, default_value_t = 0)]
    pub estoque: i64,

    /// Category id
    #[arg(required = false, long)]
    pub categoria: Option<String>,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories by name
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Create a category
    Create {
        #[arg(required = true, long)]
        nome: String,

        /// URL slug (derived from the name when omitted)
        #[arg(required = false, long)]
        slug: Option<String>,

        #[arg(required = false, long)]
        descricao: Option<String>,
    },

    /// Rename or describe a category
    Update {
        #[arg(required = true)]
        id: String,

        #[arg(required = false, long)]
        nome: Option<String>,

        #[arg(required = false, long)]
        slug: Option<String>,

        #[arg(required = false, long)]
        descricao: Option<String>,
    },

    /// Delete a category
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ImageAction {
    /// List images, optionally those of one product
    #[clap(name = "list", visible_alias = "ls")]
    List {
        #[arg(required = false, long)]
        produto: Option<String>,
    },

    /// Upload image files and attach them to a product
    #[command(arg_required_else_help = true)]
    Upload {
        /// Product id
        #[arg(required = true, long)]
        produto: String,

        /// Image files
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<String>,
    },

    /// Attach an already hosted image to a product
    Add {
        #[arg(required = true, long)]
        produto: String,

        #[arg(required = true, long)]
        url: String,

        /// Position in the gallery, starting at 0
        #[arg(required = false, long, default_value_t = 0)]
        ordem: i64,
    },

    /// Move an image within its gallery
    Reorder {
        #[arg(required = true)]
        id: String,

        #[arg(required = true, long)]
        ordem: i64,
    },

    /// Detach an image and delete the stored file
    #[clap(name = "remove", visible_alias = "rm")]
    Remove {
        #[arg(required = true)]
        id: String,

        /// Keep the stored file
        #[arg(required = false, long)]
        keep_file: bool,
    },
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// List contacts by name
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show a contact
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// Create a contact
    Create {
        #[arg(required = true, long)]
        nome: String,

        #[arg(required = true, long)]
        email: String,

        /// Phone number, 10 or 11 digits
        #[arg(required = false, long)]
        numero: Option<String>,

        #[arg(required = false, long)]
        observacao: Option<String>,
    },

    /// Update a contact
    Update {
        #[arg(required = true)]
        id: String,

        #[arg(required = false, long)]
        nome: Option<String>,

        #[arg(required = false, long)]
        email: Option<String>,

        #[arg(required = false, long)]
        numero: Option<String>,

        #[arg(required = false, long)]
        observacao: Option<String>,
    },

    /// Delete a contact
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum QuoteAction {
    /// List quote requests, newest first
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show a quote request
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// Submit a quote request as the public form does
    Submit {
        #[arg(required = true, long)]
        nome: String,

        #[arg(required = true, long)]
        email: String,

        #[arg(required = true, long)]
        mensagem: String,

        /// Files to attach
        #[arg(required = false, long = "attach", value_hint = ValueHint::FilePath)]
        attachments: Vec<String>,
    },

    /// Delete a quote request
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the store settings
    Show,

    /// Save the store settings
    Save {
        #[arg(required = true, long)]
        nome_empresa: String,

        #[arg(required = false, long)]
        logo_url: Option<String>,

        #[arg(required = false, long)]
        telefone: Option<String>,

        #[arg(required = false, long)]
        endereco: Option<String>,

        #[arg(required = false, long)]
        email_contato: Option<String>,

        #[arg(required = false, long)]
        horario_funcionamento: Option<String>,

        #[arg(required = false, long)]
        cor_primaria: Option<String>,

        #[arg(required = false, long)]
        cor_secundaria: Option<String>,

        #[arg(required = false, long)]
        cor_destaque: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Verify a session token and show its user
    Verify {
        #[arg(required = true)]
        token: String,
    },

    /// Show where the route guard sends a visitor
    Route {
        /// Requested path, e.g. /app/produtos
        #[arg(required = true)]
        path: String,

        /// Session token held by the visitor
        #[arg(required = false, long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Change the display name
    Update {
        /// Session token from `login`
        #[arg(required = true, long)]
        token: String,

        #[arg(required = true, long)]
        nome: String,
    },

    /// Change the password
    Password {
        /// Session token from `login`
        #[arg(required = true, long)]
        token: String,

        /// Current password (prompted when omitted)
        #[arg(required = false, long)]
        atual: Option<String>,

        /// New password (prompted when omitted)
        #[arg(required = false, long)]
        nova: Option<String>,

        /// New password again (prompted when omitted)
        #[arg(required = false, long)]
        confirmacao: Option<String>,
    },
}
