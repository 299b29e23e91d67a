use beacon_consensus::{generate_tickets, SortitionError, Ticket, WireFormat};
use beacon_core::{GroupRegistry, NodeConfig, RoundPhase, SelectionRound, StakingRegistry};
use beacon_crypto::{HashValue, KeyPair};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_round_from_config_file() {
    let alice = KeyPair::from_secret([11u8; 32]).public_key();
    let bob = KeyPair::from_secret([12u8; 32]).public_key();
    let mallory = KeyPair::from_secret([13u8; 32]).public_key();

    let file = write_config(&format!(
        r#"
[relay]
group_size = 4
minimum_stake = 1000
group_active_time = 3
relay_request_timeout = 2

[[stakers]]
public_key = "{}"
stake = 3000

[[stakers]]
public_key = "{}"
stake = 2500

[[groups]]
public_key = "0a0b0c"
request_id = 1
activation_block_height = 5

[[groups]]
public_key = "0d0e0f"
request_id = 2
activation_block_height = 9
"#,
        alice.compressed(),
        bob.compressed()
    ));

    let config = NodeConfig::load(file.path()).unwrap();
    let registry = StakingRegistry::from_config(&config).unwrap();
    let groups = GroupRegistry::from_config(&config).unwrap();
    assert_eq!(registry.total_virtual_stakers(), 5);
    assert_eq!(groups.count(), 2);
    assert!(!groups.is_stale(&[0x0a, 0x0b, 0x0c], 10));
    assert!(groups.is_stale(&[0x0a, 0x0b, 0x0c], 11));
    assert!(!groups.is_stale(&[0x0d, 0x0e, 0x0f], 11));

    let beacon_output = HashValue::sha256(b"seed");
    let entry = beacon_output.to_bytes();

    // Gossip delivers wire-encoded tickets, some of them twice
    let mut wire: Vec<String> = Vec::new();
    wire.extend(generate_tickets(&entry, &alice, 3).iter().map(|t| t.encode_hex()));
    wire.extend(generate_tickets(&entry, &bob, 2).iter().map(|t| t.encode_hex()));
    wire.extend(generate_tickets(&entry, &mallory, 2).iter().map(|t| t.encode_hex()));
    wire.push(wire[0].clone());

    let mut round = SelectionRound::new(entry.clone(), config.relay.clone()).unwrap();
    let tickets: Vec<Ticket> = wire
        .iter()
        .map(|encoded| Ticket::decode_hex(encoded).unwrap())
        .collect();
    assert_eq!(round.submit_all(tickets).unwrap(), 7);
    round.close_submissions().unwrap();

    let outcome = round.finalize(&registry).unwrap();
    assert_eq!(round.phase(), &RoundPhase::Selected);
    assert_eq!(outcome.selected.len(), 4);
    assert_eq!(outcome.rejected.len(), 2);
    for (ticket, reason) in &outcome.rejected {
        assert_eq!(ticket.proof.staker_public_key, mallory.compressed());
        assert!(matches!(
            reason,
            SortitionError::IndexOutOfRange { count: 0, .. }
        ));
    }
    assert!(outcome
        .members
        .iter()
        .all(|m| *m == alice.compressed() || *m == bob.compressed()));

    let responder = groups.responder_for_entry(&beacon_output).unwrap();
    let expected_index = (beacon_output.raw_bytes()[31] % 2) as usize;
    assert_eq!(responder.index, expected_index);
}

#[test]
fn test_short_round_is_reported() {
    let staker = KeyPair::from_secret([21u8; 32]).public_key();
    let config = NodeConfig::from_toml_str(&format!(
        "[relay]\ngroup_size = 6\nminimum_stake = 10\n\n[[stakers]]\npublic_key = \"{}\"\nstake = 20\n",
        staker.compressed()
    ))
    .unwrap();
    let registry = StakingRegistry::from_config(&config).unwrap();

    let entry = b"short round".to_vec();
    let mut round = SelectionRound::new(entry.clone(), config.relay).unwrap();
    round
        .submit_all(generate_tickets(&entry, &staker, 2))
        .unwrap();
    round.close_submissions().unwrap();

    let outcome = round.finalize(&registry).unwrap();
    assert!(outcome.is_short());
    assert_eq!(outcome.missing(), 4);
    assert_eq!(outcome.members.len(), 2);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("relay.toml");
    assert!(NodeConfig::load(&missing).is_err());
}
