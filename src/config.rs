use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

// --- Command line ---
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Browse a directory over HTTP", long_about = None)]
pub struct Args {
    /// Port for the browsing server
    #[arg(short = 'P', long, value_name = "PORT", default_value_t = 7005)]
    pub port: u16,

    /// Port for the download server
    #[arg(long, alias = "DP", value_name = "PORT", default_value_t = 7006)]
    pub download_port: u16,

    /// Directory to serve
    #[arg(long, alias = "PATH", value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Scheme and host used when building links, e.g. http://files.local
    #[arg(long, alias = "DOMAIN", value_name = "URL", default_value = "http://127.0.0.1")]
    pub domain: String,

    /// Address both servers bind to
    #[arg(long, value_name = "IP", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
}

/// Settings fixed at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical base path all request paths resolve against.
    pub root: PathBuf,
    pub browse_addr: SocketAddr,
    pub download_addr: SocketAddr,
    /// `domain:port`, prefix of every browse link.
    pub base_url: String,
    /// `domain:download_port`, prefix of every download link.
    pub download_url: String,
}

impl Config {
    /// Builds a config from parsed arguments, resolving the root directory.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let root = args.path.canonicalize().with_context(|| {
            format!("failed to resolve root directory '{}'", args.path.display())
        })?;
        if !root.is_dir() {
            bail!("root path '{}' is not a directory", root.display());
        }
        Ok(Self::new(root, args.bind, args.port, args.download_port, &args.domain))
    }

    /// Builds a config without touching the filesystem.
    pub fn new(root: PathBuf, bind: IpAddr, port: u16, download_port: u16, domain: &str) -> Self {
        let domain = domain.trim_end_matches('/');
        Self {
            root,
            browse_addr: SocketAddr::new(bind, port),
            download_addr: SocketAddr::new(bind, download_port),
            base_url: format!("{}:{}", domain, port),
            download_url: format!("{}:{}", domain, download_port),
        }
    }
}
