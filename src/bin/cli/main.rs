use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "catalog-cli")]
#[command(about = "CLI for interacting with the catalog server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "CATALOG_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token for protected routes
    #[arg(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the server is up
    Health,

    /// List products
    List {
        /// Category name to filter by
        #[arg(short, long)]
        category: Option<String>,
        /// Substring of the product name
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Fetch one product
    Get {
        /// Product id
        id: String,
    },

    /// Delete a product and its media
    Delete {
        /// Product id
        id: String,
    },

    /// Sign in and print the issued token
    Login {
        email: String,
        password: String,
        /// Use the admin login route
        #[arg(long)]
        admin: bool,
    },
}

struct ApiClient {
    http: Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(url: &str, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base: format!("{}/api/v1", url.trim_end_matches('/')),
            token,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = self
            .request(builder)
            .send()
            .await
            .context("Request failed")?;
        read_envelope(response).await
    }
}

/// Return the envelope, or fail with its message on an error status
async fn read_envelope(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("Unreadable response body (status {})", status))?;

    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("request failed");
        match body["error"].as_str() {
            Some(detail) => bail!("{} {}: {}", status, message, detail),
            None => bail!("{} {}", status, message),
        }
    }

    Ok(body)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.url, cli.token.clone());

    match cli.command {
        Commands::Health => {
            let body = client.send(client.http.get(client.url("/health"))).await?;
            print_json(&body["data"])?;
        }
        Commands::List {
            category,
            search,
            page,
            limit,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(category) = category {
                query.push(("category", category));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            if let Some(page) = page {
                query.push(("page", page.to_string()));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }

            let body = client
                .send(client.http.get(client.url("/product")).query(&query))
                .await?;
            let data = &body["data"];

            for product in data["products"].as_array().into_iter().flatten() {
                println!(
                    "{}  {}  {}",
                    product["id"].as_str().unwrap_or("-"),
                    product["price"],
                    product["name"].as_str().unwrap_or("-"),
                );
            }
            println!(
                "page {} of {} ({} products)",
                data["currentPage"], data["totalPages"], data["total"]
            );
        }
        Commands::Get { id } => {
            let body = client
                .send(client.http.get(client.url(&format!("/product/{}", id))))
                .await?;
            print_json(&body["data"])?;
        }
        Commands::Delete { id } => {
            let body = client
                .send(client.http.delete(client.url(&format!("/product/{}", id))))
                .await?;
            println!("{}", body["message"].as_str().unwrap_or("Deleted"));
        }
        Commands::Login {
            email,
            password,
            admin,
        } => {
            let path = if admin { "/auth/admin/login" } else { "/auth/login" };
            let body = client
                .send(
                    client
                        .http
                        .post(client.url(path))
                        .json(&json!({ "email": email, "password": password })),
                )
                .await?;

            match body["data"]["token"].as_str() {
                Some(token) => println!("{}", token),
                None => bail!("Response carried no token"),
            }
        }
    }

    Ok(())
}
