//! dhmerkle - run one key exchange with a peer over TCP.

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dhmerkle::exchange::{Derivation, ExchangeConfig, ParameterStrategy, Role, Session};
use dhmerkle::params::DEFAULT_PRIMES;
use tracing::info;

/// Port both sides use unless told otherwise.
const DEFAULT_PORT: u16 = 10000;

/// Role arguments that select the initiator. Anything else is a responder.
const INITIATOR_FLAGS: [&str; 4] = ["false", "0", "no", ""];

/// Establish a shared secret with a peer using a Diffie-Hellman-Merkle exchange
#[derive(Parser)]
#[command(name = "dhmerkle", version)]
#[command(about = "Establish a shared secret with a peer", long_about = None)]
struct Cli {
    /// Peer host to connect to, or local address to listen on as responder
    host: String,

    /// Responder flag: "false", "0", "no" or "" run the initiator, anything else the responder
    #[arg(value_parser = parse_role)]
    role: Role,

    /// TCP port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Read and write deadline in seconds for every protocol step
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Derive the secret as peer^x mod p instead of the product of public values
    #[arg(long)]
    exponentiation: bool,

    /// Reject received parameters unless the modulus is prime and the generator a primitive root
    #[arg(long)]
    strict: bool,

    /// Responder picks from the well-known parameter table instead of the prime table
    #[arg(long)]
    well_known: bool,
}

impl Cli {
    fn config(&self) -> ExchangeConfig {
        ExchangeConfig {
            strategy: if self.well_known {
                ParameterStrategy::WellKnown
            } else {
                ParameterStrategy::Generate
            },
            derivation: if self.exponentiation {
                Derivation::Exponentiation
            } else {
                Derivation::Product
            },
            verify_parameters: self.strict,
            ..ExchangeConfig::default()
        }
    }
}

fn parse_role(arg: &str) -> Result<Role, String> {
    let lowered = arg.to_lowercase();

    if INITIATOR_FLAGS.contains(&lowered.as_str()) {
        Ok(Role::Initiator)
    } else {
        Ok(Role::Responder)
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Could not resolve {host}"))?
        .next()
        .with_context(|| format!("No address found for {host}"))
}

fn connect(role: Role, addr: SocketAddr) -> Result<TcpStream> {
    info!("Setting up socket...");

    let stream = match role {
        Role::Responder => {
            let listener =
                TcpListener::bind(addr).with_context(|| format!("Could not bind {addr}"))?;

            info!("Awaiting connection on {addr}...");
            let (stream, peer) = listener.accept().context("Could not accept connection")?;
            info!("Connected to {peer}");

            stream
        }
        Role::Initiator => {
            TcpStream::connect(addr).with_context(|| format!("Could not connect to {addr}"))?
        }
    };

    info!("Socket set up");
    Ok(stream)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let addr = resolve(&cli.host, cli.port)?;
    let mut stream = connect(cli.role, addr)?;

    if let Some(secs) = cli.timeout {
        let deadline = Some(Duration::from_secs(secs));
        stream
            .set_read_timeout(deadline)
            .context("Could not set read timeout")?;
        stream
            .set_write_timeout(deadline)
            .context("Could not set write timeout")?;
    }

    let mut rng = rand::thread_rng();
    let mut session = Session::with_config(cli.role, cli.config());

    let parameters = session.establish_parameters(&mut stream, DEFAULT_PRIMES, &mut rng)?;
    match cli.role {
        Role::Responder => info!(
            modulus = parameters.modulus,
            generator = parameters.generator,
            "Public numbers sent"
        ),
        Role::Initiator => info!(
            modulus = parameters.modulus,
            generator = parameters.generator,
            "Public numbers received"
        ),
    }

    let public = session.generate_public_value(&mut rng)?;
    info!(public, "Public-private number generated");

    let peer = session.exchange_public_values(&mut stream)?;
    info!(peer, "Other public-private number received");

    let secret = session.complete()?;
    info!(secret = secret.value(), "Shared secret number established");

    Ok(())
}
