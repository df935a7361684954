use crate::config::{OutputFormat, ProveCommand, VerifyCommand};
use crate::error::CliError;
use libdleq::{DleqProof, PrivateKey, PublicKeyPair, PROOF_SIZE};
use log::*;
use rand_core::OsRng;
use std::io::Write;
use std::path::Path;

/// Sizes rayon's global pool. Without an explicit count rayon uses one thread per core.
pub fn configure_threads(threads: Option<usize>) -> Result<(), CliError> {
    if let Some(threads) = threads {
        debug!("Using {threads} worker threads");
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }
    Ok(())
}

pub fn print_random_keypair<W: Write>(out: &mut W) -> Result<(), CliError> {
    let (secret, public) = libdleq::generate(&mut OsRng)?;
    writeln!(out, "Private key: {}", secret.as_hex().as_str())?;
    print_public_keys(&public, out)
}

pub fn print_keys<W: Write>(private_key: &str, out: &mut W) -> Result<(), CliError> {
    let secret = PrivateKey::from_hex(private_key.trim())?;
    print_public_keys(&PublicKeyPair::from_private_key(&secret), out)
}

fn print_public_keys<W: Write>(keys: &PublicKeyPair, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "Ed25519 public key: {}", hex::encode(keys.ed25519_bytes()))?;
    writeln!(out, "secp256k1 public key: {}", hex::encode(keys.secp256k1_bytes()))?;
    writeln!(out, "Key pair: {}", keys.as_hex())?;
    Ok(())
}

/// Proves the given key, or a fresh one, and writes the proof to `cmd.out` or to `out`.
pub fn prove<W: Write>(cmd: &ProveCommand, format: OutputFormat, out: &mut W) -> Result<(), CliError> {
    let proof = match &cmd.private_key {
        Some(key) => libdleq::prove(&PrivateKey::from_hex(key.trim())?, &mut OsRng)?,
        None => {
            let (proof, secret) = libdleq::prove_new(&mut OsRng)?;
            eprintln!("Generated private key: {}", secret.as_hex().as_str());
            proof
        }
    };
    info!("Proof created for {}", proof.public_keys());
    let encoded = encode_proof(&proof, format);
    match &cmd.out {
        Some(path) => {
            std::fs::write(path, &encoded)?;
            info!("Proof written to {}", path.to_str().unwrap_or("[invalid utf-8 path]"));
        }
        None => out.write_all(&encoded)?,
    }
    Ok(())
}

/// Verifies the proof in `cmd.proof`. A rejected proof is returned as an error.
pub fn verify<W: Write>(cmd: &VerifyCommand, out: &mut W) -> Result<(), CliError> {
    let proof = read_proof(&cmd.proof)?;
    match &cmd.expected_keys {
        Some(expected) => {
            let expected = PublicKeyPair::from_hex(expected.trim())?;
            proof.verify_for(&expected)?;
            writeln!(out, "Proof is valid.")?;
            print_public_keys(&expected, out)
        }
        None => {
            let keys = proof.verify()?;
            writeln!(out, "Proof is valid.")?;
            print_public_keys(&keys, out)
        }
    }
}

pub fn encode_proof(proof: &DleqProof, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Hex => {
            let mut hex = proof.to_hex().into_bytes();
            hex.push(b'\n');
            hex
        }
        OutputFormat::Binary => proof.to_bytes(),
    }
}

/// Reads a proof file in either format. Binary proofs are recognised by their exact size.
pub fn read_proof<P: AsRef<Path>>(path: P) -> Result<DleqProof, CliError> {
    let bytes = std::fs::read(path)?;
    let proof = if bytes.len() == PROOF_SIZE {
        DleqProof::from_bytes(&bytes)?
    } else {
        DleqProof::from_hex(String::from_utf8_lossy(&bytes).trim())?
    };
    Ok(proof)
}
