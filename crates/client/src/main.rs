//! `flogin-console` - drive the product catalog from a terminal.

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};

use flogin_client::{
    CatalogController, ClientConfig, Credentials, DeleteOutcome, HttpCatalog, LoginController,
    LoginStatus, RemoteCatalog, SubmitOutcome, ViewSnapshot,
};
use flogin_core::{CategoryId, DomainError, ProductId, UserId};
use flogin_products::{Category, Product, ProductDraft};

#[derive(Parser)]
#[command(name = "flogin-console")]
#[command(author, version, about = "Manage the product catalog", long_about = None)]
struct Cli {
    /// Catalog API base URL (overrides FLOGIN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides FLOGIN_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the issued token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// List all products
    List,

    /// Show one product
    Show { id: ProductId },

    /// Create a product
    Create(ProductFields),

    /// Update fields of an existing product
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product
    Delete {
        id: ProductId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Default)]
struct ProductFields {
    #[arg(long)]
    name: Option<String>,
    /// Price in whole đồng
    #[arg(long)]
    price: Option<i64>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    category: Option<CategoryId>,
    /// Id of the user recorded as the product's creator
    #[arg(long)]
    created_by: Option<UserId>,
}

impl ProductFields {
    /// Overlay the given flags onto `draft`.
    fn apply(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if self.price.is_some() {
            draft.price = self.price;
        }
        if self.quantity.is_some() {
            draft.quantity = self.quantity;
        }
        if self.category.is_some() {
            draft.category_id = self.category;
        }
        if self.created_by.is_some() {
            draft.created_by_id = self.created_by;
        }
        draft
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flogin_observability::init_or(flogin_observability::LogFormat::Pretty);

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }
    tracing::debug!(?config, "client configured");

    let catalog = HttpCatalog::from_config(&config)?;
    let reference = catalog.clone();

    match cli.command {
        Commands::Login { username, password } => {
            let login = LoginController::new(catalog);
            match login.submit(Credentials::new(username, password)).await {
                LoginStatus::Authenticated(token) => println!("{}", token.as_str()),
                LoginStatus::Failed(message) => bail!(message),
                other => bail!("unexpected login state: {other:?}"),
            }
        }
        Commands::List => {
            let controller = CatalogController::new(catalog);
            controller.load_all().await;
            let categories = fetch_categories(&reference).await;
            print_list(&controller.snapshot(), &categories)?;
        }
        Commands::Show { id } => {
            let controller = CatalogController::new(catalog);
            let state = controller.load_detail(id).await;
            match state.product() {
                Some(product) => print_product(product, &fetch_categories(&reference).await),
                None => bail!(
                    "{}",
                    state.error_message().unwrap_or("product could not be loaded")
                ),
            }
        }
        Commands::Create(fields) => {
            let controller = CatalogController::new(catalog);
            controller.begin_create().await;
            let outcome = controller.submit_form(fields.apply(ProductDraft::default())).await;
            report_submit(outcome, &form_categories(&controller))?;
        }
        Commands::Update { id, fields } => {
            let controller = CatalogController::new(catalog);
            controller.load_all().await;
            ensure_listed(&controller.snapshot())?;
            controller
                .begin_edit(id)
                .await
                .ok_or_else(|| anyhow!("product {id} is not in the catalog"))?;
            let current = controller
                .snapshot()
                .form
                .map(|form| form.fields().clone())
                .unwrap_or_default();
            let outcome = controller.submit_form(fields.apply(current)).await;
            report_submit(outcome, &form_categories(&controller))?;
        }
        Commands::Delete { id, yes } => {
            let controller = CatalogController::new(catalog);
            controller.load_all().await;
            ensure_listed(&controller.snapshot())?;
            controller
                .begin_delete(id)
                .ok_or_else(|| anyhow!("product {id} is not in the catalog"))?;

            if !yes {
                if let Some(session) = controller.snapshot().deletion {
                    print_product(session.target(), &fetch_categories(&reference).await);
                }
                println!("re-run with --yes to delete");
                controller.cancel_delete();
                return Ok(());
            }

            match controller.confirm_delete().await {
                DeleteOutcome::Deleted(id) => println!("deleted product {id}"),
                DeleteOutcome::Failed(err) => bail!("{}: {}", controller_banner(&controller), err),
                other => bail!("delete did not complete: {other:?}"),
            }
        }
    }

    Ok(())
}

fn controller_banner(controller: &CatalogController<HttpCatalog>) -> String {
    controller
        .snapshot()
        .banner
        .unwrap_or_else(|| "delete failed".to_string())
}

fn ensure_listed(snapshot: &ViewSnapshot) -> anyhow::Result<()> {
    if snapshot.list.is_ready() {
        return Ok(());
    }
    bail!(
        "{}",
        snapshot
            .list
            .error_message()
            .unwrap_or("product list unavailable")
    )
}

/// Category options for display. A failed fetch only costs the names.
async fn fetch_categories(catalog: &HttpCatalog) -> Vec<Category> {
    match catalog.list_categories().await {
        Ok(categories) => categories,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load category names");
            Vec::new()
        }
    }
}

/// Categories the open (or just closed) form loaded.
fn form_categories(controller: &CatalogController<HttpCatalog>) -> Vec<Category> {
    controller.snapshot().categories.unwrap_or_default()
}

fn category_label(categories: &[Category], id: CategoryId) -> String {
    match Category::find(categories, id) {
        Ok(category) => format!("{} ({id})", category.name),
        Err(_) => id.to_string(),
    }
}

fn report_submit(outcome: SubmitOutcome, categories: &[Category]) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Saved(product) => {
            print_product(&product, categories);
            Ok(())
        }
        SubmitOutcome::Invalid(violations) => Err(DomainError::from(violations).into()),
        SubmitOutcome::Failed(err) => bail!(err.user_message()),
        other => bail!("save did not complete: {other:?}"),
    }
}

fn print_list(snapshot: &ViewSnapshot, categories: &[Category]) -> anyhow::Result<()> {
    ensure_listed(snapshot)?;
    let items = snapshot.list.items();
    if items.is_empty() {
        println!("no products");
        return Ok(());
    }
    println!("{:>6}  {:<32} {:>14} {:>8}  {}", "ID", "NAME", "PRICE", "QTY", "CATEGORY");
    for p in items {
        println!(
            "{:>6}  {:<32} {:>14} {:>8}  {}",
            p.id,
            p.name,
            p.price,
            p.quantity,
            category_label(categories, p.category_id)
        );
    }
    Ok(())
}

fn print_product(product: &Product, categories: &[Category]) {
    println!("id:        {}", product.id);
    println!("name:      {}", product.name);
    println!("price:     {}", product.price);
    println!("quantity:  {}", product.quantity);
    println!("category:  {}", category_label(categories, product.category_id));
    if let Some(user) = product.created_by_id {
        println!("created by: {user}");
    }
}
