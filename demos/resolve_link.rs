//! Example: resolve a share text passed on the command line
//!
//! ```text
//! cargo run --example resolve_link -- "看看这个 https://v.douyin.com/abc123/ 超好笑"
//! ```

use tracing_subscriber::EnvFilter;
use video_link_info::{Error, LinkResolver, ResolverOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,video_link_info=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let resolver = LinkResolver::new(ResolverOptions::from_env())?;

    match resolver.resolve(&text).await {
        Ok(info) => {
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Err(Error::NoUrlFound) => {
            eprintln!("未检测到链接");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}
