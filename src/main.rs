//! SwapShop Wishlist CLI
//!
//! Shows or toggles a user's wishlist against the configured API.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use swapshop_wishlist::{
    HttpRemoteStore, ItemId, MemoryRemoteStore, RemoteStore, UserId, WishlistConfig,
    WishlistContext, WishlistState,
};

#[derive(Parser)]
#[command(name = "swapshop-wishlist")]
#[command(about = "Show or toggle a SwapShop wishlist")]
struct Cli {
    /// Path to the JSON config file
    config: PathBuf,

    /// User whose wishlist to load
    user: String,

    /// Use an empty in-process store instead of the API
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Save the item if it is not wishlisted, unsave it otherwise
    Toggle { item_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = WishlistConfig::load(&cli.config)?;

    if let Some(dir) = &config.log_dir {
        rolling_logger::init_logger(dir.clone(), "SwapShop")?;
    }

    let remote: Arc<dyn RemoteStore> = if cli.offline {
        Arc::new(MemoryRemoteStore::new())
    } else {
        Arc::new(HttpRemoteStore::new(&config)?)
    };
    let ctx = WishlistContext::new(remote.clone(), &config);

    ctx.login(UserId::from(cli.user.as_str())).await?;

    if let Some(Command::Toggle { item_id }) = cli.command {
        let item = remote.get_item(&ItemId::from(item_id.as_str())).await?;
        let outcome = ctx.toggle(&item).await?;
        println!("{}: {:?}", item.name, outcome);
    }

    match ctx.get() {
        WishlistState::Ready(wishlist) => {
            println!("Wishlist ({} items)", wishlist.count());
            for entry in wishlist.entries() {
                println!("  {}  {:<32} ${:.2}", entry.item_id, entry.name, entry.price);
            }
        }
        other => println!("Wishlist not loaded: {:?}", other),
    }
    Ok(())
}
