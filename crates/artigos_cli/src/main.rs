use anyhow::Result;
use artigos_core::ArtigoStorage;
use artigos_storage::{PersistenceBackend, StorageConfig, DEFAULT_DATA_FILE};
use artigos_web::{ServerConfig, DEFAULT_BIND};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Article collection backend", long_about = None)]
pub struct Cli {
    /// Storage backend: json (default) or memory
    #[arg(long, default_value = "json")]
    storage: String,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,
        /// JSON document holding the articles
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data_file: PathBuf,
        /// Static directory; uploads go to its images/ subdirectory
        #[arg(long, default_value = "static")]
        static_dir: PathBuf,
        /// Largest accepted request body, in MiB
        #[arg(long, default_value_t = 16)]
        max_upload_mb: usize,
        /// Reject creates and updates whose slug another article already uses
        #[arg(long)]
        enforce_unique_slugs: bool,
    },
    /// Print the stored articles
    List {
        #[arg(long, default_value = DEFAULT_DATA_FILE)]
        data_file: PathBuf,
    },
}

async fn open_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn ArtigoStorage>> {
    let storage = artigos_storage::create_storage(kind, config).await?;
    info!("💾 Storage ready (using {})", kind);
    Ok(storage)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            bind,
            data_file,
            static_dir,
            max_upload_mb,
            enforce_unique_slugs,
        } => {
            let upload_dir = static_dir.join("images");
            let storage_config = StorageConfig::default()
                .with_data_file(data_file)
                .with_upload_dir(&upload_dir)
                .with_unique_slugs(enforce_unique_slugs);
            let storage = open_storage(&cli.storage, &storage_config).await?;

            let server_config = ServerConfig {
                bind,
                upload_dir,
                max_body_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            };
            artigos_web::serve(server_config, storage, artigos_web::shutdown_signal()).await?;
        }
        Commands::List { data_file } => {
            let storage_config = StorageConfig::default().with_data_file(data_file);
            let backend = artigos_storage::open_backend(&cli.storage, &storage_config)?;
            let artigos = backend.load().await?;
            println!("{} article(s)", artigos.len());
            for artigo in artigos {
                println!("{:>4}  {:<32}  {}", artigo.index, artigo.slug, artigo.titulo);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["artigos", "serve"]).unwrap();
        assert_eq!(cli.storage, "json");
        match cli.command {
            Commands::Serve {
                bind,
                data_file,
                static_dir,
                max_upload_mb,
                enforce_unique_slugs,
            } => {
                assert_eq!(bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
                assert_eq!(data_file, PathBuf::from("artigos.json"));
                assert_eq!(static_dir, PathBuf::from("static"));
                assert_eq!(max_upload_mb, 16);
                assert!(!enforce_unique_slugs);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "artigos",
            "--storage",
            "memory",
            "-v",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--enforce-unique-slugs",
        ])
        .unwrap();
        assert_eq!(cli.storage, "memory");
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Serve { enforce_unique_slugs: true, .. }
        ));
    }
}
