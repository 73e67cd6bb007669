//! Round-trip law, identity, empty cases, determinism, header invariant,
//! and termination on a pathological plateau.

use std::io::Cursor;

fn generate(old: &[u8], new: &[u8]) -> Vec<u8> {
    let mut patch = Vec::new();
    ddelta::generate(old, new, &mut patch, |_| {}).unwrap();
    patch
}

fn apply(old: &[u8], patch: &[u8]) -> Vec<u8> {
    let mut new = Vec::new();
    ddelta::apply(&mut Cursor::new(old), &mut new, &mut Cursor::new(patch)).unwrap();
    new
}

#[test]
fn round_trip_law_holds_over_random_pairs() {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let old_len = rng.gen_range(0..=4096);
        let new_len = rng.gen_range(0..=4096);
        let old: Vec<u8> = (0..old_len).map(|_| rng.gen()).collect();
        let new: Vec<u8> = (0..new_len).map(|_| rng.gen()).collect();
        let patch = generate(&old, &new);
        assert_eq!(apply(&old, &patch), new);
    }
}

#[test]
fn identity_reproduces_input_with_all_zero_diff() {
    let data: Vec<u8> = (0..5000u32).map(|n| (n % 251) as u8).collect();
    let patch = generate(&data, &data);
    assert_eq!(apply(&data, &patch), data);

    // Header + single record + |data| diff bytes + terminator, no extra.
    assert_eq!(patch.len(), 16 + 24 + data.len() + 24);
    let diff_start = 16 + 24;
    assert!(patch[diff_start..diff_start + data.len()]
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn empty_old_and_new_produces_bare_terminator() {
    let patch = generate(&[], &[]);
    assert_eq!(patch.len(), 16 + 24);
    assert_eq!(&patch[..8], b"DDELTA40");
    assert_eq!(u64::from_be_bytes(patch[8..16].try_into().unwrap()), 0);
    assert!(patch[16..].iter().all(|&b| b == 0));
}

#[test]
fn nonempty_old_to_empty_new_produces_bare_terminator() {
    let patch = generate(b"some old content", &[]);
    assert_eq!(patch.len(), 16 + 24);
    assert_eq!(u64::from_be_bytes(patch[8..16].try_into().unwrap()), 0);
    assert_eq!(apply(b"some old content", &patch), Vec::<u8>::new());
}

#[test]
fn header_declares_new_file_size_big_endian() {
    let new = b"twenty-two byte string";
    assert_eq!(new.len(), 23);
    let patch = generate(b"", new);
    assert_eq!(&patch[..8], b"DDELTA40");
    assert_eq!(
        u64::from_be_bytes(patch[8..16].try_into().unwrap()),
        new.len() as u64
    );
}

#[test]
fn generation_is_deterministic() {
    let old = b"the quick brown fox jumps over the lazy dog, repeatedly, many times over";
    let new = b"the slow brown fox jumps over the idle dog, repeatedly, many times over, too";
    let a = generate(old, new);
    let b = generate(old, new);
    assert_eq!(a, b);
}

#[test]
fn terminates_on_near_identical_plateau_with_sparse_bit_flips() {
    let old = vec![b'A'; 100_000];
    let mut new = old.clone();
    let mut i = 0;
    while i < new.len() {
        new[i] ^= 0x01;
        i += 128;
    }
    let patch = generate(&old, &new);
    assert_eq!(apply(&old, &patch), new);
}
