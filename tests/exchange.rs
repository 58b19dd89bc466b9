use std::io::{self, Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use dhmerkle::exchange::{
    Derivation, ErrorKind, ExchangeConfig, ParameterStrategy, Phase, PrivateExponent, Role,
    Session, SharedSecret, State, run_exchange, run_exchange_with, shared_secret,
};
use dhmerkle::params::{DEFAULT_PRIMES, ParameterError, Parameters};
use dhmerkle::wire::{encode_parameters, encode_value};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Channel fed from a fixed byte script that records everything written.
struct Scripted {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl Scripted {
    fn new(input: Vec<u8>) -> Self {
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
        }
    }
}

impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for Scripted {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn tcp_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let initiator = TcpStream::connect(addr).unwrap();
    let (responder, _) = listener.accept().unwrap();

    (responder, initiator)
}

fn script(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn responder_scenario_eleven_two() {
    let mut channel = Scripted::new(encode_value(9).to_vec());
    let mut session = Session::new(Role::Responder);

    session.send_parameters(&mut channel, Parameters::new(11, 2)).unwrap();
    assert_eq!(session.state(), State::ParametersExchanged);

    let public = session.compute_public_value(PrivateExponent::new(3)).unwrap();
    assert_eq!(public, 5);
    assert_eq!(session.state(), State::PublicValuesComputed);

    let peer = session.exchange_public_values(&mut channel).unwrap();
    assert_eq!(peer, 9);
    assert_eq!(session.state(), State::IntermediateExchanged);
    assert_eq!(session.public_value(), Some(5));
    assert_eq!(session.peer_value(), Some(9));

    let secret = session.complete().unwrap();
    assert_eq!(secret.value(), 45);
    assert_eq!(secret.to_bytes(), 45u64.to_le_bytes());
    assert_eq!(session.state(), State::Complete);

    let expected = script(&[&encode_parameters(&Parameters::new(11, 2)), &encode_value(5)]);
    assert_eq!(channel.output, expected);
}

#[test]
fn initiator_scenario_eleven_two() {
    let input = script(&[&encode_parameters(&Parameters::new(11, 2)), &encode_value(5)]);
    let mut channel = Scripted::new(input);
    let mut session = Session::new(Role::Initiator);

    assert_eq!(session.role(), Role::Initiator);
    assert_eq!(session.public_value(), None);
    assert_eq!(session.peer_value(), None);

    let params = session.receive_parameters(&mut channel).unwrap();
    assert_eq!(params, Parameters::new(11, 2));

    assert_eq!(session.compute_public_value(PrivateExponent::new(5)).unwrap(), 9);
    assert_eq!(session.exchange_public_values(&mut channel).unwrap(), 5);
    assert_eq!(session.peer_value(), Some(5));
    assert_eq!(session.complete().unwrap().to_bytes(), 45u64.to_le_bytes());

    assert_eq!(channel.output, encode_value(9).to_vec());
}

#[test]
fn public_value_follows_repeated_multiplication() {
    let params = Parameters::new(199, 3);

    for x in 0..300u64 {
        let mut r = params.generator;
        for _ in 0..x {
            r = r * params.generator % params.modulus;
        }

        let mut session = Session::new(Role::Responder);
        session.send_parameters(&mut io::sink(), params).unwrap();

        assert_eq!(session.compute_public_value(PrivateExponent::new(x)).unwrap(), r);
    }
}

#[test]
fn exponentiation_derivation_scenario() {
    let config = ExchangeConfig {
        derivation: Derivation::Exponentiation,
        ..ExchangeConfig::default()
    };

    let mut responder = Session::with_config(Role::Responder, config.clone());
    let mut out = Scripted::new(encode_value(10).to_vec());
    responder.send_parameters(&mut out, Parameters::new(11, 2)).unwrap();
    assert_eq!(responder.compute_public_value(PrivateExponent::new(3)).unwrap(), 8);
    responder.exchange_public_values(&mut out).unwrap();

    let input = script(&[&encode_parameters(&Parameters::new(11, 2)), &encode_value(8)]);
    let mut initiator = Session::with_config(Role::Initiator, config);
    let mut channel = Scripted::new(input);
    initiator.receive_parameters(&mut channel).unwrap();
    assert_eq!(initiator.compute_public_value(PrivateExponent::new(5)).unwrap(), 10);
    initiator.exchange_public_values(&mut channel).unwrap();

    let a = responder.complete().unwrap();
    let b = initiator.complete().unwrap();
    assert_eq!(a.value(), 10);
    assert_eq!(a, b);
}

#[test]
fn short_parameters_message_is_channel_error() {
    let bytes = encode_parameters(&Parameters::new(11, 2));
    let mut channel = Scripted::new(bytes[..10].to_vec());
    let mut rng = StdRng::seed_from_u64(0);

    let err = run_exchange(Role::Initiator, &mut channel, DEFAULT_PRIMES, &mut rng).unwrap_err();

    assert_eq!(err.phase, Phase::Parameters);
    assert!(matches!(err.kind, ErrorKind::ChannelIo(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    assert!(channel.output.is_empty());
}

#[test]
fn failed_session_keeps_no_parameters() {
    let mut channel = Scripted::new(vec![0u8; 10]);
    let mut session = Session::new(Role::Initiator);

    assert!(session.receive_parameters(&mut channel).is_err());
    assert_eq!(session.state(), State::Failed(Phase::Parameters));
    assert_eq!(session.parameters(), None);
}

#[test]
fn failed_session_rejects_further_steps() {
    let mut channel = Scripted::new(Vec::new());
    let mut session = Session::new(Role::Initiator);

    session.receive_parameters(&mut channel).unwrap_err();

    let err = session.receive_parameters(&mut channel).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfOrder(State::Failed(Phase::Parameters))));

    let err = session.complete().unwrap_err();
    assert_eq!(err.phase, Phase::Completion);
}

#[test]
fn zero_modulus_is_malformed() {
    let input = encode_parameters(&Parameters::new(0, 2)).to_vec();
    let mut session = Session::new(Role::Initiator);

    let err = session.receive_parameters(&mut Scripted::new(input)).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::MalformedParameters(ParameterError::ModulusTooSmall(0))
    ));
    assert_eq!(session.state(), State::Failed(Phase::Parameters));
}

#[test]
fn generator_out_of_range_is_malformed() {
    let input = encode_parameters(&Parameters::new(11, 11)).to_vec();
    let mut session = Session::new(Role::Initiator);

    let err = session.receive_parameters(&mut Scripted::new(input)).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::MalformedParameters(ParameterError::GeneratorOutOfRange { .. })
    ));
}

#[test]
fn strict_verification_rejects_non_root() {
    let input = encode_parameters(&Parameters::new(11, 3)).to_vec();

    let mut lenient = Session::new(Role::Initiator);
    assert!(lenient.receive_parameters(&mut Scripted::new(input.clone())).is_ok());

    let config = ExchangeConfig {
        verify_parameters: true,
        ..ExchangeConfig::default()
    };
    let mut strict = Session::with_config(Role::Initiator, config);
    let err = strict.receive_parameters(&mut Scripted::new(input)).unwrap_err();

    assert!(matches!(
        err.kind,
        ErrorKind::MalformedParameters(ParameterError::NotPrimitiveRoot { generator: 3, modulus: 11 })
    ));
}

#[test]
fn initiator_reads_before_writing() {
    let input = encode_parameters(&Parameters::new(11, 2)).to_vec();
    let mut channel = Scripted::new(input);
    let mut rng = StdRng::seed_from_u64(5);

    let err = run_exchange(Role::Initiator, &mut channel, DEFAULT_PRIMES, &mut rng).unwrap_err();

    assert_eq!(err.phase, Phase::ValueExchange);
    assert!(err.is_channel_error());
    assert!(channel.output.is_empty());
}

#[test]
fn responder_writes_before_reading() {
    let mut channel = Scripted::new(Vec::new());
    let mut session = Session::new(Role::Responder);

    session.send_parameters(&mut channel, Parameters::new(11, 2)).unwrap();
    session.compute_public_value(PrivateExponent::new(3)).unwrap();

    let err = session.exchange_public_values(&mut channel).unwrap_err();

    assert_eq!(err.phase, Phase::ValueExchange);
    assert_eq!(session.state(), State::Failed(Phase::ValueExchange));
    assert_eq!(&channel.output[16..], &encode_value(5));
}

#[test]
fn responder_rejects_malformed_parameters_before_writing() {
    let mut out = Vec::new();
    let mut session = Session::new(Role::Responder);

    let err = session.send_parameters(&mut out, Parameters::new(11, 0)).unwrap_err();

    assert_eq!(err.phase, Phase::Parameters);
    assert!(matches!(
        err.kind,
        ErrorKind::MalformedParameters(ParameterError::GeneratorOutOfRange { .. })
    ));
    assert_eq!(session.state(), State::Failed(Phase::Parameters));
    assert_eq!(session.parameters(), None);
    assert!(out.is_empty());
}

#[test]
fn zero_exponent_bound_yields_generator() {
    let config = ExchangeConfig {
        max_private_exponent: 0,
        ..ExchangeConfig::default()
    };
    let mut session = Session::with_config(Role::Responder, config);
    assert_eq!(session.config().max_private_exponent, 0);

    session.send_parameters(&mut io::sink(), Parameters::new(11, 2)).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(session.generate_public_value(&mut rng).unwrap(), 2);
}

#[test]
fn full_exponent_range_is_accepted() {
    const LARGE_PRIME: u64 = 18_446_744_073_709_551_557;

    let config = ExchangeConfig {
        max_private_exponent: u64::MAX,
        ..ExchangeConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(9);

    for _ in 0..32 {
        let mut session = Session::with_config(Role::Responder, config.clone());
        session
            .send_parameters(&mut io::sink(), Parameters::new(LARGE_PRIME, 2))
            .unwrap();

        let public = session.generate_public_value(&mut rng).unwrap();
        assert!(public < LARGE_PRIME);
    }
}

#[test]
fn drawn_exponents_stay_within_bound() {
    let mut rng = StdRng::seed_from_u64(1);

    for max in [0, 1, 5, 1000] {
        for _ in 0..200 {
            assert!(PrivateExponent::generate(&mut rng, max).value() <= max);
        }
    }
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    assert_eq!(format!("{:?}", PrivateExponent::new(42)), "PrivateExponent(..)");
    assert_eq!(format!("{:?}", SharedSecret::new(42)), "SharedSecret(..)");
}

#[test]
fn product_secret_wraps_instead_of_failing() {
    let params = Parameters::new(11, 2);
    let x = PrivateExponent::new(0);

    let secret = shared_secret(&params, &x, u64::MAX, 2, Derivation::Product);
    assert_eq!(secret.value(), u64::MAX.wrapping_mul(2));
}

#[test]
fn steps_out_of_order_leave_state_unchanged() {
    let mut session = Session::new(Role::Responder);

    let err = session.complete().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfOrder(State::Idle)));

    let err = session.compute_public_value(PrivateExponent::new(1)).unwrap_err();
    assert_eq!(err.phase, Phase::KeyGeneration);

    assert_eq!(session.state(), State::Idle);
}

#[test]
fn steps_for_other_role_are_rejected() {
    let mut initiator = Session::new(Role::Initiator);
    let err = initiator
        .send_parameters(&mut io::sink(), Parameters::new(11, 2))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::WrongRole(Role::Initiator)));

    let mut responder = Session::new(Role::Responder);
    let err = responder.receive_parameters(&mut io::empty()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::WrongRole(Role::Responder)));

    assert_eq!(initiator.state(), State::Idle);
    assert_eq!(responder.state(), State::Idle);
}

#[test]
fn empty_prime_table_fails_responder() {
    let mut channel = Scripted::new(Vec::new());
    let mut rng = StdRng::seed_from_u64(0);

    let err = run_exchange(Role::Responder, &mut channel, &[], &mut rng).unwrap_err();

    assert_eq!(err.phase, Phase::Parameters);
    assert!(matches!(err.kind, ErrorKind::EmptyPrimeTable));
    assert!(channel.output.is_empty());
}

#[test]
fn composite_prime_table_fails_responder() {
    let mut channel = Scripted::new(Vec::new());
    let mut rng = StdRng::seed_from_u64(0);

    let err = run_exchange(Role::Responder, &mut channel, &[15], &mut rng).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::NoPrimitiveRootFound { modulus: 15 }));
}

#[test]
fn exchange_over_tcp() {
    let (mut responder, mut initiator) = tcp_pair();

    let handle = thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(11);
        run_exchange(Role::Responder, &mut responder, DEFAULT_PRIMES, &mut rng).unwrap()
    });

    let mut rng = StdRng::seed_from_u64(22);
    let ours = run_exchange(Role::Initiator, &mut initiator, DEFAULT_PRIMES, &mut rng).unwrap();
    let theirs = handle.join().unwrap();

    assert_eq!(ours, theirs);
}

#[test]
fn exchange_over_tcp_with_textbook_derivation() {
    let config = ExchangeConfig {
        strategy: ParameterStrategy::WellKnown,
        derivation: Derivation::Exponentiation,
        verify_parameters: true,
        ..ExchangeConfig::default()
    };
    let (mut responder, mut initiator) = tcp_pair();

    let responder_config = config.clone();
    let handle = thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(3);
        run_exchange_with(Role::Responder, responder_config, &mut responder, DEFAULT_PRIMES, &mut rng)
            .unwrap()
    });

    let mut rng = StdRng::seed_from_u64(4);
    let ours = run_exchange_with(Role::Initiator, config, &mut initiator, DEFAULT_PRIMES, &mut rng)
        .unwrap();
    let theirs = handle.join().unwrap();

    assert_eq!(ours, theirs);
    assert!(ours.value() < 11);
}

#[test]
fn concurrent_sessions_do_not_interfere() {
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            thread::spawn(move || {
                let (mut responder, mut initiator) = tcp_pair();

                let server = thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(100 + i);
                    run_exchange(Role::Responder, &mut responder, DEFAULT_PRIMES, &mut rng).unwrap()
                });

                let mut rng = StdRng::seed_from_u64(200 + i);
                let ours =
                    run_exchange(Role::Initiator, &mut initiator, DEFAULT_PRIMES, &mut rng).unwrap();

                (ours, server.join().unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (ours, theirs) = handle.join().unwrap();
        assert_eq!(ours, theirs);
    }
}

#[test]
fn read_deadline_aborts_exchange() {
    let (_responder, mut initiator) = tcp_pair();
    initiator
        .set_read_timeout(Some(Duration::from_millis(50)))
        .unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let err = run_exchange(Role::Initiator, &mut initiator, DEFAULT_PRIMES, &mut rng).unwrap_err();

    assert_eq!(err.phase, Phase::Parameters);
    assert!(err.is_channel_error());
}
