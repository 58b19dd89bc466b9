//! The key exchange state machine.
//!
//! A [`Session`] walks through the protocol one step at a time:
//!
//! ```text
//! Idle
//!   -> ParametersExchanged      responder sends (p, g), initiator receives it
//!   -> PublicValuesComputed     both draw x and derive their public value
//!   -> IntermediateExchanged    responder sends then receives,
//!                               initiator receives then sends
//!   -> Complete                 both derive the shared secret
//! ```
//!
//! Any channel error or malformed peer data moves the session to
//! [`State::Failed`]; nothing is retried. Each step issues its own blocking
//! reads and writes, so deadlines set on the underlying socket apply to
//! every operation separately.

use std::fmt;
use std::io::{self, Read, Write};

use rand::Rng;

use crate::exchange::config::{ExchangeConfig, ParameterStrategy};
use crate::exchange::error::{ErrorKind, ExchangeError, Phase, Result};
use crate::exchange::keys::{self, PrivateExponent, SharedSecret};
use crate::params::{Parameters, choose_well_known, select_parameters};
use crate::wire;

/// Which side of the exchange a session plays.
///
/// The responder chooses the parameters and speaks first in every round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Initiator,
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
        })
    }
}

/// Progress of a session through the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    ParametersExchanged,
    PublicValuesComputed,
    IntermediateExchanged,
    Complete,
    /// Terminal; carries the phase that failed.
    Failed(Phase),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => f.write_str("idle"),
            State::ParametersExchanged => f.write_str("parameters exchanged"),
            State::PublicValuesComputed => f.write_str("public values computed"),
            State::IntermediateExchanged => f.write_str("intermediate values exchanged"),
            State::Complete => f.write_str("complete"),
            State::Failed(phase) => write!(f, "failed during {phase}"),
        }
    }
}

/// One run of the exchange with a single peer.
///
/// All secret material lives in the session, so independent sessions can
/// run side by side. The private exponent is wiped as soon as the secret
/// has been derived or the session fails.
pub struct Session {
    role: Role,
    config: ExchangeConfig,
    state: State,
    parameters: Option<Parameters>,
    exponent: Option<PrivateExponent>,
    public_value: Option<u64>,
    peer_value: Option<u64>,
}

impl Session {
    /// Creates a session with the default configuration.
    pub fn new(role: Role) -> Self {
        Self::with_config(role, ExchangeConfig::default())
    }

    pub fn with_config(role: Role, config: ExchangeConfig) -> Self {
        Self {
            role,
            config,
            state: State::Idle,
            parameters: None,
            exponent: None,
            public_value: None,
            peer_value: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// The agreed parameters, once exchanged.
    pub fn parameters(&self) -> Option<Parameters> {
        self.parameters
    }

    /// This party's public value, once computed.
    pub fn public_value(&self) -> Option<u64> {
        self.public_value
    }

    /// The peer's public value, once received.
    pub fn peer_value(&self) -> Option<u64> {
        self.peer_value
    }

    /// Runs every step in order and returns the shared secret.
    pub fn run<C, R>(&mut self, channel: &mut C, primes: &[u64], rng: &mut R) -> Result<SharedSecret>
    where
        C: Read + Write + ?Sized,
        R: Rng,
    {
        self.establish_parameters(channel, primes, rng)?;
        self.generate_public_value(rng)?;
        self.exchange_public_values(channel)?;
        self.complete()
    }

    /// `Idle -> ParametersExchanged` for either role.
    ///
    /// The responder obtains a pair according to the configured
    /// [`ParameterStrategy`] and sends it; the initiator receives one.
    /// `primes` is only consulted by a responder using
    /// [`ParameterStrategy::Generate`].
    pub fn establish_parameters<C, R>(
        &mut self,
        channel: &mut C,
        primes: &[u64],
        rng: &mut R,
    ) -> Result<Parameters>
    where
        C: Read + Write + ?Sized,
        R: Rng,
    {
        match self.role {
            Role::Initiator => self.receive_parameters(channel),
            Role::Responder => {
                self.require(State::Idle, Phase::Parameters)?;

                let strategy = self.config.strategy;
                let parameters = match strategy {
                    ParameterStrategy::Generate => select_parameters(primes, rng)
                        .map_err(|err| self.fail(Phase::Parameters, err.into()))?,
                    ParameterStrategy::WellKnown => choose_well_known(rng),
                };

                self.send_parameters(channel, parameters)?;
                Ok(parameters)
            }
        }
    }

    /// Responder side of `Idle -> ParametersExchanged`: sends `parameters`.
    ///
    /// The pair must pass [`Parameters::validate`].
    pub fn send_parameters<C>(&mut self, channel: &mut C, parameters: Parameters) -> Result<()>
    where
        C: Write + ?Sized,
    {
        self.require_role(Role::Responder, Phase::Parameters)?;
        self.require(State::Idle, Phase::Parameters)?;

        parameters
            .validate()
            .map_err(|err| self.fail(Phase::Parameters, err.into()))?;

        wire::write_parameters(channel, &parameters)
            .map_err(|err| self.fail(Phase::Parameters, err.into()))?;

        self.parameters = Some(parameters);
        self.state = State::ParametersExchanged;

        Ok(())
    }

    /// Initiator side of `Idle -> ParametersExchanged`: reads exactly one
    /// parameter message and checks it.
    pub fn receive_parameters<C>(&mut self, channel: &mut C) -> Result<Parameters>
    where
        C: Read + ?Sized,
    {
        self.require_role(Role::Initiator, Phase::Parameters)?;
        self.require(State::Idle, Phase::Parameters)?;

        let parameters =
            wire::read_parameters(channel).map_err(|err| self.fail(Phase::Parameters, err.into()))?;

        let checked = if self.config.verify_parameters {
            parameters.verify()
        } else {
            parameters.validate()
        };
        checked.map_err(|err| self.fail(Phase::Parameters, err.into()))?;

        self.parameters = Some(parameters);
        self.state = State::ParametersExchanged;

        Ok(parameters)
    }

    /// `ParametersExchanged -> PublicValuesComputed` with a freshly drawn
    /// private exponent. Returns the public value.
    pub fn generate_public_value<R: Rng>(&mut self, rng: &mut R) -> Result<u64> {
        self.require(State::ParametersExchanged, Phase::KeyGeneration)?;

        let exponent = PrivateExponent::generate(rng, self.config.max_private_exponent);
        self.compute_public_value(exponent)
    }

    /// `ParametersExchanged -> PublicValuesComputed` with a caller supplied
    /// private exponent. Returns the public value.
    pub fn compute_public_value(&mut self, exponent: PrivateExponent) -> Result<u64> {
        self.require(State::ParametersExchanged, Phase::KeyGeneration)?;

        let Some(parameters) = self.parameters else {
            return Err(self.out_of_order(Phase::KeyGeneration));
        };

        let value = keys::public_value(&parameters, &exponent, self.config.derivation);

        self.exponent = Some(exponent);
        self.public_value = Some(value);
        self.state = State::PublicValuesComputed;

        Ok(value)
    }

    /// `PublicValuesComputed -> IntermediateExchanged`.
    ///
    /// The responder writes its value before reading the peer's; the
    /// initiator reads first. Returns the peer's public value.
    pub fn exchange_public_values<C>(&mut self, channel: &mut C) -> Result<u64>
    where
        C: Read + Write + ?Sized,
    {
        self.require(State::PublicValuesComputed, Phase::ValueExchange)?;

        let Some(local) = self.public_value else {
            return Err(self.out_of_order(Phase::ValueExchange));
        };

        let peer = swap_values(self.role, channel, local)
            .map_err(|err| self.fail(Phase::ValueExchange, err.into()))?;

        self.peer_value = Some(peer);
        self.state = State::IntermediateExchanged;

        Ok(peer)
    }

    /// `IntermediateExchanged -> Complete`: derives the shared secret and
    /// wipes the private exponent.
    pub fn complete(&mut self) -> Result<SharedSecret> {
        self.require(State::IntermediateExchanged, Phase::Completion)?;

        let (Some(parameters), Some(exponent), Some(local), Some(peer)) = (
            self.parameters,
            self.exponent.as_ref(),
            self.public_value,
            self.peer_value,
        ) else {
            return Err(self.out_of_order(Phase::Completion));
        };

        let secret = keys::shared_secret(&parameters, exponent, local, peer, self.config.derivation);

        self.exponent = None;
        self.state = State::Complete;

        Ok(secret)
    }

    fn require(&self, expected: State, phase: Phase) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.out_of_order(phase))
        }
    }

    fn require_role(&self, expected: Role, phase: Phase) -> Result<()> {
        if self.role == expected {
            Ok(())
        } else {
            Err(ExchangeError::new(phase, ErrorKind::WrongRole(self.role)))
        }
    }

    fn out_of_order(&self, phase: Phase) -> ExchangeError {
        ExchangeError::new(phase, ErrorKind::OutOfOrder(self.state))
    }

    fn fail(&mut self, phase: Phase, kind: ErrorKind) -> ExchangeError {
        self.state = State::Failed(phase);
        self.exponent = None;

        ExchangeError::new(phase, kind)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("parameters", &self.parameters)
            .field("public_value", &self.public_value)
            .field("peer_value", &self.peer_value)
            .finish_non_exhaustive()
    }
}

/// Sends `local` and receives the peer's value in the order fixed by `role`.
fn swap_values<C>(role: Role, channel: &mut C, local: u64) -> io::Result<u64>
where
    C: Read + Write + ?Sized,
{
    match role {
        Role::Responder => {
            wire::write_value(channel, local)?;
            wire::read_value(channel)
        }
        Role::Initiator => {
            let peer = wire::read_value(channel)?;
            wire::write_value(channel, local)?;
            Ok(peer)
        }
    }
}

/// Runs a complete exchange with the default configuration.
///
/// `channel` must already be connected to the peer, and the peer must run
/// the opposite `role`. `primes` is the responder's modulus table (see
/// [`crate::params::DEFAULT_PRIMES`]); `rng` supplies the private exponent
/// and, for the responder, the parameter choice.
pub fn run_exchange<C, R>(role: Role, channel: &mut C, primes: &[u64], rng: &mut R) -> Result<SharedSecret>
where
    C: Read + Write + ?Sized,
    R: Rng,
{
    run_exchange_with(role, ExchangeConfig::default(), channel, primes, rng)
}

/// Runs a complete exchange with an explicit configuration.
pub fn run_exchange_with<C, R>(
    role: Role,
    config: ExchangeConfig,
    channel: &mut C,
    primes: &[u64],
    rng: &mut R,
) -> Result<SharedSecret>
where
    C: Read + Write + ?Sized,
    R: Rng,
{
    Session::with_config(role, config).run(channel, primes, rng)
}
